//! SAS Logon endpoint paths and persisted file names

/// Token endpoint, relative to the deployment base URL
pub const TOKEN_PATH: &str = "/SASLogon/oauth/token";

/// Authorization endpoint the user opens in a browser
pub const AUTHORIZE_PATH: &str = "/SASLogon/oauth/authorize";

pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// File holding the raw access token
pub const ACCESS_TOKEN_FILE: &str = "access_token.txt";

/// File holding the raw refresh token
pub const REFRESH_TOKEN_FILE: &str = "refresh_token.txt";
