//! API route constants
//!
//! Paths are relative to the configured base URL.

/// Session endpoints (unauthenticated)
pub mod auth {
    /// POST credentials
    pub const LOGIN: &str = "/login";
    /// POST a new account
    pub const REGISTER: &str = "/register";
    /// POST a refresh token for a new grant
    pub const REFRESH: &str = "/refresh";
    /// POST a refresh token to revoke it
    pub const LOGOUT: &str = "/logout";
}

/// Current user
pub mod users {
    /// GET or PUT the profile
    pub const ME: &str = "/users/me";
    /// PUT a password change
    pub const PASSWORD: &str = "/users/me/password";
}

/// Application settings
pub mod settings {
    /// GET the settings snapshot
    pub const APPLICATION: &str = "/settings";
}

/// Catalogue and investments
pub mod products {
    /// GET the catalogue
    pub const LIST: &str = "/products";

    /// GET one product
    pub fn by_id(id: &str) -> String {
        format!("/products/{}", super::urlencode(id))
    }

    /// POST a purchase
    pub fn purchase(id: &str) -> String {
        format!("/products/{}/purchase", super::urlencode(id))
    }

    /// GET the user's investments
    pub const INVESTMENTS: &str = "/investments";
}

/// Bank account, withdrawals and ledger
pub mod wallet {
    /// GET or PUT the payout account
    pub const BANK: &str = "/bank";
    /// GET history or POST a request
    pub const WITHDRAWALS: &str = "/withdrawals";
    /// GET the ledger
    pub const TRANSACTIONS: &str = "/transactions";
}

/// Referral team
pub mod team {
    /// GET the team summary
    pub const SUMMARY: &str = "/team";
}

/// Prize wheel
pub mod spin {
    /// GET for status, POST to spin
    pub const WHEEL: &str = "/spin";
}

/// Testimonials
pub mod forum {
    /// GET posts or POST a new one
    pub const POSTS: &str = "/forum/posts";
}

/// Administrator endpoints
pub mod admin {
    /// GET all users
    pub const USERS: &str = "/admin/users";
    /// GET pending withdrawals
    pub const WITHDRAWALS: &str = "/admin/withdrawals";

    /// POST an approval
    pub fn approve_withdrawal(id: &str) -> String {
        format!("/admin/withdrawals/{}/approve", super::urlencode(id))
    }

    /// POST a rejection
    pub fn reject_withdrawal(id: &str) -> String {
        format!("/admin/withdrawals/{}/reject", super::urlencode(id))
    }
}

/// Percent-encode a single path segment
fn urlencode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
