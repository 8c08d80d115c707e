use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ShotError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ShotError::fetch("x").to_string().contains("fetch error:"));
    assert!(ShotError::decode("x").to_string().contains("decode error:"));
    assert!(ShotError::font("x").to_string().contains("font error:"));
    assert!(ShotError::render("x").to_string().contains("render error:"));
    assert_eq!(ShotError::Cancelled.to_string(), "render pass cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShotError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_cancelled());
    assert!(ShotError::Cancelled.is_cancelled());
}
