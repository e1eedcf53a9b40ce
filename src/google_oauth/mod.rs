pub mod claims;
pub mod endpoints;

pub use claims::IdClaims;
pub use endpoints::GoogleOauthEndpoints;
