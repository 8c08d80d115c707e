use super::*;

const SAMPLE: &str = r##"{
    "id": "duo",
    "canvas": { "width": 1600, "height": 1200 },
    "devices": {
        "desktop": {
            "x": 100, "y": 200, "width": 1000, "height": 625,
            "borderRadius": 12, "shadow": true,
            "mockupImage": "frames/laptop.png",
            "mockupConfig": { "x": 60, "y": 160, "width": 1080, "height": 720 }
        },
        "mobile": { "x": 1150, "y": 300, "width": 300, "height": 620, "mockup": false }
    },
    "extraDevices": [
        { "x": 10, "y": 10, "width": 100, "height": 200, "crop": false, "screenshot": "mobile" }
    ],
    "elements": [
        { "id": "title", "type": "text", "x": 800, "y": 60, "fontSize": 64,
          "fontWeight": "bold", "textAlign": "center", "content": "Hello" },
        { "id": "subtitle", "type": "text", "x": 40, "y": 1100, "fontSize": 24,
          "fontWeight": 500, "maxWidth": 600 }
    ]
}"##;

#[test]
fn parses_full_template_with_defaults() {
    let t = Template::from_json_str(SAMPLE).unwrap();
    assert_eq!(t.id, "duo");
    assert_eq!(t.canvas, Canvas::new(1600, 1200).unwrap());

    let desktop = t.devices.desktop.as_ref().unwrap();
    assert!(desktop.crop);
    assert!(desktop.mockup);
    assert!(desktop.shadow);
    assert_eq!(desktop.rect.to_rect(), Rect::new(100.0, 200.0, 1100.0, 825.0));
    assert_eq!(desktop.frame_rect(), Rect::new(60.0, 160.0, 1140.0, 880.0));

    let mobile = t.devices.mobile.as_ref().unwrap();
    assert!(!mobile.mockup);
    assert!(!mobile.shadow);
    assert_eq!(mobile.frame_rect(), mobile.rect.to_rect());

    let extra = &t.extra_devices[0];
    assert!(!extra.crop);
    assert_eq!(extra.screenshot, Some(ScreenshotKind::Mobile));

    let title = &t.elements[0];
    assert_eq!(title.font_weight, FontWeight::Bold);
    assert_eq!(title.text_align, TextAlign::Center);
    assert_eq!(title.max_width_or(t.canvas), 1600.0);

    let sub = &t.elements[1];
    assert_eq!(sub.font_weight, FontWeight::Normal);
    assert_eq!(sub.text_align, TextAlign::Left);
    assert_eq!(sub.max_width_or(t.canvas), 600.0);
    assert_eq!(sub.content, "");
}

#[test]
fn slots_follow_draw_order() {
    let t = Template::from_json_str(SAMPLE).unwrap();
    let roles: Vec<SlotRole> = t.slots().map(|(r, _)| r).collect();
    assert_eq!(
        roles,
        vec![SlotRole::Desktop, SlotRole::Mobile, SlotRole::Extra(0)]
    );
    assert_eq!(SlotRole::Extra(0).default_screenshot(), ScreenshotKind::Desktop);
    assert_eq!(SlotRole::Mobile.default_screenshot(), ScreenshotKind::Mobile);
}

#[test]
fn font_weight_accepts_names_and_numbers() {
    let w: FontWeight = serde_json::from_value(serde_json::json!("bold")).unwrap();
    assert_eq!(w.value(), 700);
    let w: FontWeight = serde_json::from_value(serde_json::json!("600")).unwrap();
    assert_eq!(w, FontWeight::Bold);
    let w: FontWeight = serde_json::from_value(serde_json::json!("normal")).unwrap();
    assert_eq!(w.value(), 400);
    let w: FontWeight = serde_json::from_value(serde_json::json!(300)).unwrap();
    assert_eq!(w, FontWeight::Normal);
}

#[test]
fn text_align_accepts_logical_aliases() {
    let a: TextAlign = serde_json::from_value(serde_json::json!("start")).unwrap();
    assert_eq!(a, TextAlign::Left);
    let a: TextAlign = serde_json::from_value(serde_json::json!("end")).unwrap();
    assert_eq!(a, TextAlign::Right);
}

#[test]
fn validation_rejects_bad_geometry_and_duplicate_ids() {
    let zero_slot = r#"{"id":"t","canvas":{"width":10,"height":10},
        "devices":{"desktop":{"x":0,"y":0,"width":0,"height":5}}}"#;
    assert!(Template::from_json_str(zero_slot).is_err());

    let dup = r#"{"id":"t","canvas":{"width":10,"height":10},"elements":[
        {"id":"a","type":"text","x":0,"y":0,"fontSize":10},
        {"id":"a","type":"text","x":0,"y":0,"fontSize":10}]}"#;
    assert!(Template::from_json_str(dup).is_err());

    let bad_size = r#"{"id":"t","canvas":{"width":10,"height":10},"elements":[
        {"id":"a","type":"text","x":0,"y":0,"fontSize":0}]}"#;
    assert!(Template::from_json_str(bad_size).is_err());

    let unknown_type = r#"{"id":"t","canvas":{"width":10,"height":10},"elements":[
        {"id":"a","type":"image","x":0,"y":0,"fontSize":10}]}"#;
    assert!(Template::from_json_str(unknown_type).is_err());
}
