// Minimal HTML pages. The dashboard UI itself lives elsewhere; these exist so the
// page routes in the policy have something to serve.

use axum::response::Html;

use crate::auth::Identity;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
  <form id="login">
    <input name="email" type="email" placeholder="Email" required>
    <input name="password" type="password" placeholder="Password" required>
    <button type="submit">Sign in</button>
  </form>
  <p id="error"></p>
  <script>
    document.getElementById('login').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      const res = await fetch('/api/auth/login', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ email: form.get('email'), password: form.get('password') }),
      });
      if (res.ok) {
        window.location.assign('/dashboard');
      } else {
        document.getElementById('error').textContent = (await res.json()).message;
      }
    });
  </script>
</body>
</html>
"#;

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn home_page(identity: Identity) -> Html<String> {
    page("Home", &identity)
}

pub async fn dashboard_page(identity: Identity) -> Html<String> {
    page("Dashboard", &identity)
}

pub async fn settings_page(identity: Identity) -> Html<String> {
    page("Settings", &identity)
}

fn page(title: &str, identity: &Identity) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n  <h1>{title}</h1>\n  <p>Signed in as user {} ({})</p>\n  \
         <a href=\"/api/auth/logout\">Sign out</a>\n</body>\n</html>\n",
        identity.subject_id, identity.role
    ))
}
