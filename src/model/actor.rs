/// The identified person performing an operation, resolved once at the request
/// boundary instead of being re-derived inside each handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Stable account id; absent for anonymous-with-supplied-name callers.
    pub user_id: Option<u64>,
    /// Never empty. Falls back to [`Actor::FALLBACK_NAME`].
    pub display_name: String,
}

impl Actor {
    pub const FALLBACK_NAME: &'static str = "Unknown User";

    /// Resolution order: explicit override → account display name →
    /// account username → fallback sentinel. Blank candidates are skipped.
    pub fn resolve(
        override_name: Option<&str>,
        user_id: Option<u64>,
        account_display_name: Option<&str>,
        account_username: Option<&str>,
    ) -> Self {
        let display_name = [override_name, account_display_name, account_username]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .unwrap_or(Self::FALLBACK_NAME)
            .to_string();

        Actor {
            user_id,
            display_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_name_wins() {
        let actor = Actor::resolve(Some("Maya R"), Some(7), Some("Maya Rahman"), Some("maya"));
        assert_eq!(actor.display_name, "Maya R");
        assert_eq!(actor.user_id, Some(7));
    }

    #[test]
    fn blank_override_falls_through_to_account_name() {
        let actor = Actor::resolve(Some("   "), Some(7), Some("Maya Rahman"), Some("maya"));
        assert_eq!(actor.display_name, "Maya Rahman");
    }

    #[test]
    fn username_used_when_no_display_name_on_account() {
        let actor = Actor::resolve(None, Some(7), None, Some("maya"));
        assert_eq!(actor.display_name, "maya");
    }

    #[test]
    fn fully_anonymous_gets_the_sentinel() {
        let actor = Actor::resolve(None, None, None, None);
        assert_eq!(actor.display_name, Actor::FALLBACK_NAME);
        assert_eq!(actor.user_id, None);
    }
}
