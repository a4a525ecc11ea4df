use modkit::api::ValidationErrors;
use unicode_general_category::{get_general_category, GeneralCategory};

pub const LOGIN_FIELD: &str = "login";
pub const LOGIN_REQUIRED: &str = "Login must be specified";
pub const LOGIN_ALPHANUMERIC: &str = "Login should contain only letters or digits";

/// Letter (`L*`) or decimal digit (`Nd`). Other numerals and marks are excluded.
fn is_letter_or_digit(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
            | GeneralCategory::DecimalNumber
    )
}

/// Non-empty and letters/digits only (Unicode aware).
pub fn is_login_valid(login: &str) -> bool {
    !login.is_empty() && login.chars().all(is_letter_or_digit)
}

/// Record the login rule violation, if any, under `"login"`.
pub fn validate_login(login: Option<&str>, errors: &mut ValidationErrors) {
    match login {
        None | Some("") => errors.add(LOGIN_FIELD, LOGIN_REQUIRED),
        Some(l) if !is_login_valid(l) => errors.add(LOGIN_FIELD, LOGIN_ALPHANUMERIC),
        Some(_) => {}
    }
}
