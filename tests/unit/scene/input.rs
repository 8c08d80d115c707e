use super::*;

fn template() -> Arc<Template> {
    Arc::new(
        Template::from_json_str(
            r#"{"id":"t","canvas":{"width":100,"height":50},"elements":[
                {"id":"title","type":"text","x":0,"y":0,"fontSize":10,"content":"Default"},
                {"id":"body","type":"text","x":0,"y":20,"fontSize":10,"content":"Body"}]}"#,
        )
        .unwrap(),
    )
}

#[test]
fn override_beats_page_title_beats_default() {
    let t = template();
    let title = &t.elements[0];
    let body = &t.elements[1];

    let input = RenderInput::new(t.clone());
    assert_eq!(input.resolved_text(title), Some("Default"));

    let input = input.with_captures(CaptureSet {
        page_title: Some("Example Domain".to_owned()),
        ..CaptureSet::default()
    });
    assert_eq!(input.resolved_text(title), Some("Example Domain"));
    assert_eq!(input.resolved_text(body), Some("Body"));

    let input = input.with_text("title", "Custom");
    assert_eq!(input.resolved_text(title), Some("Custom"));
}

#[test]
fn blank_content_suppresses_element() {
    let t = template();
    let input = RenderInput::new(t.clone()).with_text("body", "   \t ");
    assert_eq!(input.resolved_text(&t.elements[1]), None);
}

#[test]
fn fingerprint_tracks_every_input() {
    let t = template();
    let base = RenderInput::new(t.clone());
    assert_eq!(base.fingerprint(), RenderInput::new(t.clone()).fingerprint());

    let mut style = StyleParams::default();
    style.enable_shadow = false;
    assert_ne!(
        base.fingerprint(),
        base.clone().with_style(style).fingerprint()
    );
    assert_ne!(
        base.fingerprint(),
        base.clone().with_text("body", "x").fingerprint()
    );
    assert_ne!(
        base.fingerprint(),
        base.clone()
            .with_captures(CaptureSet {
                desktop: Some(AssetSource::parse("shots/a.png")),
                ..CaptureSet::default()
            })
            .fingerprint()
    );
}
