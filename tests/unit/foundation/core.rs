use super::*;

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, MAX_SURFACE_DIM + 1).is_err());
    let c = Canvas::new(1600, 1200).unwrap();
    assert_eq!(c.bounds(), Rect::new(0.0, 0.0, 1600.0, 1200.0));
}

#[test]
fn parses_hex_short_long_and_alpha() {
    assert_eq!(Rgba8::parse_hex("#ff0000").unwrap(), Rgba8::rgb(255, 0, 0));
    assert_eq!(Rgba8::parse_hex("0F0").unwrap(), Rgba8::rgb(0, 255, 0));
    assert_eq!(
        Rgba8::parse_hex("#0000ff80").unwrap(),
        Rgba8::new(0, 0, 255, 128)
    );
    assert!(Rgba8::parse_hex("#12345").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
}

#[test]
fn hex_output_drops_alpha_when_opaque() {
    assert_eq!(Rgba8::rgb(26, 26, 26).to_hex(), "#1a1a1a");
    assert_eq!(Rgba8::new(0, 0, 0, 64).to_hex(), "#00000040");
}

#[test]
fn serde_uses_hex_strings() {
    let c: Rgba8 = serde_json::from_value(serde_json::json!("#336699")).unwrap();
    assert_eq!(c, Rgba8::rgb(0x33, 0x66, 0x99));
    assert_eq!(serde_json::to_value(c).unwrap(), serde_json::json!("#336699"));
    assert!(serde_json::from_value::<Rgba8>(serde_json::json!("blue")).is_err());
}

#[test]
fn premul_rounds_to_nearest() {
    let p = Rgba8::new(100, 50, 200, 128).to_premul();
    assert_eq!(
        p.to_array(),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}
