//! Status code to error message table.

use std::borrow::Cow;

const STATUS_MESSAGES: &[(u16, &str)] = &[
    (
        400,
        "400 - Bad Request: a client-supplied parameter is invalid, \
         e.g. the operator or the namespace does not exist",
    ),
    (
        401,
        "401 - Unauthorized: the token is missing, invalid or expired",
    ),
    (
        403,
        "403 - Forbidden: the token is not authorized for the targeted resource",
    ),
    (
        404,
        "404 - Not Found: the URL or one of its path parameters does not \
         resolve to an existing resource",
    ),
    (
        405,
        "405 - Method Not Allowed: the endpoint does not accept this HTTP method",
    ),
    (
        500,
        "500 - Internal Server Error: unclassified failure on the portal side",
    ),
];

/// Message for a non-200 status. Unlisted codes echo the numeric value.
pub fn error_message(status: u16) -> Cow<'static, str> {
    match STATUS_MESSAGES.iter().find(|(code, _)| *code == status) {
        Some(&(_, message)) => Cow::Borrowed(message),
        None => Cow::Owned(format!("unrecognized status code: {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_their_category() {
        let cases = [
            (400, "Bad Request"),
            (401, "Unauthorized"),
            (403, "Forbidden"),
            (404, "Not Found"),
            (405, "Method Not Allowed"),
            (500, "Internal Server Error"),
        ];
        for (status, category) in cases {
            let message = error_message(status);
            assert!(
                message.starts_with(&format!("{status} - {category}")),
                "{status}: {message}"
            );
        }
    }

    #[test]
    fn unknown_codes_echo_the_number() {
        for status in [201, 302, 418, 429, 502, 503] {
            let message = error_message(status);
            assert!(message.contains(&status.to_string()), "{message}");
            assert!(message.starts_with("unrecognized status code"));
        }
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        for (i, (code, _)) in STATUS_MESSAGES.iter().enumerate() {
            assert!(STATUS_MESSAGES[i + 1..].iter().all(|(c, _)| c != code));
        }
    }
}
