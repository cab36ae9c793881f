// Session issuer endpoints. Both are public routes: the gate lets them through
// without a credential.

pub mod login; // POST /api/auth/login - authenticate and receive a session token
pub mod logout; // GET|POST /api/auth/logout - drop the session cookie

pub use login::login_post;
pub use logout::logout;
