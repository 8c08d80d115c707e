use super::*;

fn per_char(px: f64) -> impl FnMut(&str) -> f64 {
    move |s: &str| s.chars().count() as f64 * px
}

#[test]
fn quick_brown_fox_wraps_three_then_two() {
    let lines = wrap_lines("The quick brown fox jumps", 170.0, &mut per_char(10.0));
    assert_eq!(lines, vec!["The quick brown ", "fox jumps "]);
}

#[test]
fn words_are_never_split() {
    let lines = wrap_lines("a extraordinarily b", 50.0, &mut per_char(10.0));
    assert_eq!(lines, vec!["a ", "extraordinarily ", "b "]);
}

#[test]
fn single_word_and_empty_content() {
    assert_eq!(
        wrap_lines("Hello", 10.0, &mut per_char(10.0)),
        vec!["Hello "]
    );
    assert_eq!(wrap_lines("", 10.0, &mut per_char(10.0)), vec![" "]);
}

#[test]
fn measure_sees_candidate_lines() {
    let mut seen = Vec::new();
    let mut m = |s: &str| {
        seen.push(s.to_owned());
        0.0
    };
    wrap_lines("a b", 100.0, &mut m);
    assert_eq!(seen, vec!["a ", "a b "]);
}

#[test]
fn alignment_offsets_from_anchor() {
    assert_eq!(aligned_x(TextAlign::Left, 100.0, 40.0), 100.0);
    assert_eq!(aligned_x(TextAlign::Center, 100.0, 40.0), 80.0);
    assert_eq!(aligned_x(TextAlign::Right, 100.0, 40.0), 60.0);
}

#[test]
fn placed_lines_advance_by_line_height() {
    let lines = place_lines(
        "The quick brown fox jumps",
        500.0,
        40.0,
        TextAlign::Center,
        170.0,
        24.0,
        &mut per_char(10.0),
    );
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].y, 40.0);
    assert_eq!(lines[1].y, 64.0);
    assert_eq!(lines[0].width, 160.0);
    assert_eq!(lines[0].x, 420.0);
    assert_eq!(lines[1].x, 450.0);
}
