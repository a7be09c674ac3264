use super::*;

#[test]
fn formats_known_status_codes() {
    assert_eq!(format_status("pending"), Ok("En attente"));
    assert_eq!(format_status("accepted"), Ok("Accepté"));
    assert_eq!(format_status("refused"), Ok("Refusé"));
}

#[test]
fn unknown_status_code_fails() {
    assert!(format_status("Pending").is_err());
    assert!(format_status("").is_err());
}

#[test]
fn formats_iso_dates_in_french() {
    assert_eq!(format_date("2004-04-04"), "4 Avr. 04");
    assert_eq!(format_date("2021-12-25"), "25 Déc. 21");
    assert_eq!(format_date("2003-08-03"), "3 Aoû. 03");
    assert_eq!(format_date("2000-02-10"), "10 Fév. 00");
}

#[test]
fn malformed_dates_are_returned_unchanged() {
    assert_eq!(format_date("not a date"), "not a date");
    assert_eq!(format_date("2021-13-01"), "2021-13-01");
}

#[test]
fn parses_leading_integers_like_a_form_field() {
    assert_eq!(parse_leading_int("348"), Some(348));
    assert_eq!(parse_leading_int("  348.50"), Some(348));
    assert_eq!(parse_leading_int("20%"), Some(20));
    assert_eq!(parse_leading_int("-5"), Some(-5));
    assert_eq!(parse_leading_int("+7"), Some(7));
    assert_eq!(parse_leading_int(""), None);
    assert_eq!(parse_leading_int("abc"), None);
    assert_eq!(parse_leading_int("-"), None);
}
