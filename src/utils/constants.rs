use std::time::Duration;

/// Fixed literal the platform expects to be signed at login.
pub const SIGN_IN_MESSAGE: &str = "Sign-in";

/// Server message that marks a completion call as already done (idempotent success).
pub const ALREADY_DONE_MESSAGE: &str = "You have finished this task yet!";

pub const CSRF_COOKIE_PATH: &str = "/sanctum/csrf-cookie";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const USER_INFO_PATH: &str = "/api/user";

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org/?format=json";

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(2_000);

/// Pacing between consecutive completion calls for one account.
pub const TASK_DELAY: Duration = Duration::from_secs(2);

pub const DEFAULT_ACCOUNT_DELAY_SECS: u64 = 5;
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 24 * 60 * 60;

pub const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";
