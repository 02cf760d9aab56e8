//! Page access rules driven by auth state.

use serde::{Deserialize, Serialize};

use crate::auth::AuthState;

/// Pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Login,
    Signup,
    Dashboard,
    Profile,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
        }
    }

    /// Pages only signed-in users may see.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Profile)
    }

    /// Pages signed-in users are sent away from.
    pub fn guest_only(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }
}

impl std::str::FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('/') {
            "" | "home" => Ok(Self::Home),
            "login" => Ok(Self::Login),
            "signup" => Ok(Self::Signup),
            "dashboard" => Ok(Self::Dashboard),
            "profile" => Ok(Self::Profile),
            other => Err(format!("Unknown page: {other}")),
        }
    }
}

/// What to do when a client opens a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageAccess {
    Render,
    /// The initial session check has not resolved; show a spinner.
    Loading,
    Redirect { to: Page, path: &'static str },
}

impl PageAccess {
    fn redirect(to: Page) -> Self {
        Self::Redirect {
            to,
            path: to.path(),
        }
    }
}

/// Decide page access. No redirect is issued while auth is still loading.
pub fn guard(page: Page, auth: &AuthState) -> PageAccess {
    if auth.loading {
        return PageAccess::Loading;
    }
    if page.guest_only() && auth.is_authenticated {
        return PageAccess::redirect(Page::Dashboard);
    }
    if page.requires_auth() && !auth.is_authenticated {
        return PageAccess::redirect(Page::Login);
    }
    PageAccess::Render
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(is_authenticated: bool, loading: bool) -> AuthState {
        AuthState {
            is_authenticated,
            loading,
            user: None,
        }
    }

    #[test]
    fn loading_never_redirects() {
        for page in [Page::Home, Page::Login, Page::Signup, Page::Dashboard, Page::Profile] {
            assert_eq!(guard(page, &state(false, true)), PageAccess::Loading);
            assert_eq!(guard(page, &state(true, true)), PageAccess::Loading);
        }
    }

    #[test]
    fn signed_in_users_skip_login_and_signup() {
        let signed_in = state(true, false);
        for page in [Page::Login, Page::Signup] {
            assert_eq!(
                guard(page, &signed_in),
                PageAccess::Redirect {
                    to: Page::Dashboard,
                    path: "/dashboard"
                }
            );
        }
        assert_eq!(guard(Page::Dashboard, &signed_in), PageAccess::Render);
        assert_eq!(guard(Page::Profile, &signed_in), PageAccess::Render);
    }

    #[test]
    fn guests_sent_to_login() {
        let guest = state(false, false);
        for page in [Page::Dashboard, Page::Profile] {
            assert_eq!(
                guard(page, &guest),
                PageAccess::Redirect {
                    to: Page::Login,
                    path: "/login"
                }
            );
        }
        assert_eq!(guard(Page::Home, &guest), PageAccess::Render);
        assert_eq!(guard(Page::Signup, &guest), PageAccess::Render);
    }

    #[test]
    fn parse_pages() {
        assert_eq!("/dashboard".parse::<Page>().unwrap(), Page::Dashboard);
        assert_eq!("home".parse::<Page>().unwrap(), Page::Home);
        assert_eq!("/".parse::<Page>().unwrap(), Page::Home);
        assert!("admin".parse::<Page>().is_err());
    }

    #[test]
    fn access_serializes_tagged() {
        let json = serde_json::to_value(guard(Page::Profile, &state(false, false))).unwrap();
        assert_eq!(json["action"], "redirect");
        assert_eq!(json["to"], "login");
        assert_eq!(json["path"], "/login");
    }
}
