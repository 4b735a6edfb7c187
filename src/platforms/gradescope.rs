//! Gradescope client.
//!
//! Gradescope has no public API, so this drives the instructor web pages with a
//! blocking `reqwest` client and a cookie store: log in with the page's
//! authenticity token, scrape courses, memberships and assignments, and POST
//! extensions with the page's CSRF token. The page parsing lives in small pure
//! functions so the selectors can be tested against saved markup.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use super::{filter_by_title, Assignment, Credentials, GradingCourse, GradingPlatform, PlatformError};

const PLATFORM: &str = "Gradescope";

static AUTH_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="authenticity_token"[^>]*?value="([^"]+)""#).expect("valid regex")
});
static CSRF_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]*name="csrf-token"[^>]*content="([^"]+)""#).expect("valid regex")
});
static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"courseList--term[^"]*"[^>]*>(?P<term>[^<]*)<"#,
        r#"|href="/courses/(?P<id>\d+)""#,
        r#"|courseBox--shortname[^"]*"[^>]*>(?P<short>[^<]*)<"#,
        r#"|courseBox--name[^"]*"[^>]*>(?P<name>[^<]*)<"#,
    ))
    .expect("valid regex")
});
static DATA_CM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-cm="([^"]*)""#).expect("valid regex"));
static DATA_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-email="([^"]+)""#).expect("valid regex"));
static ASSIGNMENT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*href="/courses/\d+/assignments/(\d+)[^"]*"[^>]*>([^<]+)</a>"#)
        .expect("valid regex")
});
static REACT_PROPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-react-props="([^"]*)""#).expect("valid regex"));
static ASSIGNMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"assignments?[_/](\d+)").expect("valid regex"));

/// A course member as listed on the memberships page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Gradescope user id, needed to target extensions
    pub user_id: Option<String>,
    /// Email address
    pub email: String,
}

/// Logged-in Gradescope session (blocking).
pub struct GradescopeClient {
    http: Client,
    base_url: String,
    members: RefCell<HashMap<String, Vec<Member>>>,
}

impl GradescopeClient {
    /// Log in and return a ready client.
    ///
    /// # Errors
    /// Returns [`PlatformError::Auth`] when the credentials are refused, or a
    /// network/parse error if the login page cannot be used.
    pub fn login(base_url: &str, credentials: &Credentials) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .user_agent(format!("gstools/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .cookie_store(true)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let landing = http
            .get(format!("{base_url}/login"))
            .send()?
            .error_for_status()?
            .text()?;
        let token = extract_authenticity_token(&landing).ok_or_else(|| {
            PlatformError::Parse("login page has no authenticity token".to_string())
        })?;

        crate::debug!("Logging in to {PLATFORM} as {}", credentials.email);
        let resp = http
            .post(format!("{base_url}/login"))
            .form(&[
                ("utf8", "✓"),
                ("session[email]", credentials.email.as_str()),
                ("session[password]", credentials.password.as_str()),
                ("session[remember_me]", "0"),
                ("commit", "Log In"),
                ("session[remember_me_sso]", "0"),
                ("authenticity_token", token.as_str()),
            ])
            .send()?
            .error_for_status()?;

        if resp.url().path().starts_with("/login") {
            return Err(PlatformError::Auth {
                platform: PLATFORM,
                reason: "invalid email or password".to_string(),
            });
        }

        crate::info!("Connected to {PLATFORM}");
        Ok(Self {
            http,
            base_url,
            members: RefCell::new(HashMap::new()),
        })
    }

    fn get_page(&self, path: &str) -> Result<String, PlatformError> {
        let url = format!("{}{path}", self.base_url);
        crate::debug!("GET {url}");
        let resp = self.http.get(&url).send()?;
        Ok(check_status(resp)?.text()?)
    }

    /// Course members, fetched once per course and cached for the session
    fn course_members(&self, course_id: &str) -> Result<Vec<Member>, PlatformError> {
        if let Some(members) = self.members.borrow().get(course_id) {
            return Ok(members.clone());
        }
        let html = self.get_page(&format!("/courses/{course_id}/memberships"))?;
        let members = parse_members(&html);
        if members.is_empty() {
            crate::warn!("No members found on the {PLATFORM} roster of course {course_id}");
        }
        self.members
            .borrow_mut()
            .insert(course_id.to_string(), members.clone());
        Ok(members)
    }
}

impl GradingPlatform for GradescopeClient {
    fn list_courses(&self) -> Result<Vec<GradingCourse>, PlatformError> {
        let html = self.get_page("/account")?;
        Ok(parse_account_courses(&html))
    }

    fn enrolled_emails(&self, course_id: &str) -> Result<HashSet<String>, PlatformError> {
        Ok(self
            .course_members(course_id)?
            .into_iter()
            .map(|member| member.email)
            .collect())
    }

    fn find_assignments(
        &self,
        course_id: &str,
        title_substring: &str,
    ) -> Result<Vec<Assignment>, PlatformError> {
        let html = self.get_page(&format!("/courses/{course_id}/assignments"))?;
        Ok(filter_by_title(parse_assignments(&html), title_substring))
    }

    fn apply_extension(
        &self,
        course_id: &str,
        assignment: &Assignment,
        email: &str,
        days: u32,
    ) -> Result<(), PlatformError> {
        let user_id = self
            .course_members(course_id)?
            .into_iter()
            .find(|member| member.email == email)
            .and_then(|member| member.user_id)
            .ok_or_else(|| {
                PlatformError::NotFound(format!("{email} is not enrolled in course {course_id}"))
            })?;

        let path = format!("/courses/{course_id}/assignments/{}/extensions", assignment.id);
        let page = self.get_page(&path)?;
        let csrf = extract_csrf_token(&page).ok_or_else(|| {
            PlatformError::Parse(format!("no CSRF token on {path}"))
        })?;

        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("X-CSRF-Token", csrf)
            .json(&extension_body(&user_id, days))
            .send()?;
        check_status(resp)?;
        Ok(())
    }
}

fn check_status(resp: Response) -> Result<Response, PlatformError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    Err(PlatformError::Http(status.as_u16(), url))
}

/// Request body for a relative extension of `days` days past the original deadline
#[must_use]
pub fn extension_body(user_id: &str, days: u32) -> Value {
    let user_id: Value = user_id
        .parse::<u64>()
        .map_or_else(|_| Value::String(user_id.to_string()), Value::from);
    json!({
        "override": {
            "user_id": user_id,
            "settings": {
                "visible": true,
                "due_date": {
                    "type": "relative",
                    "value": { "days": days, "hours": 0, "minutes": 0 }
                }
            }
        }
    })
}

/// Undo the HTML entity escaping Gradescope applies to attribute values
#[must_use]
pub fn unescape_html(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Login form token
#[must_use]
pub fn extract_authenticity_token(html: &str) -> Option<String> {
    AUTH_TOKEN_RE
        .captures(html)
        .map(|caps| unescape_html(&caps[1]))
        .or_else(|| extract_csrf_token(html))
}

/// `<meta name="csrf-token">` value
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_META_RE.captures(html).map(|caps| unescape_html(&caps[1]))
}

/// Courses listed on the `/account` page, each tagged with the term heading above it
#[must_use]
pub fn parse_account_courses(html: &str) -> Vec<GradingCourse> {
    let mut courses: Vec<GradingCourse> = Vec::new();
    let mut term = String::new();

    for caps in ACCOUNT_RE.captures_iter(html) {
        if let Some(m) = caps.name("term") {
            term = m.as_str().trim().to_string();
        } else if let Some(m) = caps.name("id") {
            courses.push(GradingCourse {
                id: m.as_str().to_string(),
                name: String::new(),
                term: term.clone(),
            });
        } else if let Some(m) = caps.name("short") {
            if let Some(course) = courses.last_mut() {
                course.name = unescape_html(m.as_str().trim());
            }
        } else if let Some(m) = caps.name("name") {
            if let Some(course) = courses.last_mut().filter(|c| c.name.is_empty()) {
                course.name = unescape_html(m.as_str().trim());
            }
        }
    }

    let mut seen = HashSet::new();
    courses.retain(|course| seen.insert(course.id.clone()));
    courses
}

/// Members listed on the memberships page.
///
/// Rows carry a `data-cm` JSON attribute; older markup only has `data-email`.
#[must_use]
pub fn parse_members(html: &str) -> Vec<Member> {
    let mut members: Vec<Member> = DATA_CM_RE
        .captures_iter(html)
        .filter_map(|caps| serde_json::from_str::<Value>(&unescape_html(&caps[1])).ok())
        .filter_map(|cm| {
            let email = cm["email"].as_str()?.trim().to_string();
            let user_id = ["user_id", "id"].iter().find_map(|key| match &cm[*key] {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            });
            Some(Member { user_id, email })
        })
        .collect();

    if members.is_empty() {
        members = DATA_EMAIL_RE
            .captures_iter(html)
            .map(|caps| Member {
                user_id: None,
                email: unescape_html(&caps[1]),
            })
            .collect();
    }
    members
}

/// Assignments listed on a course's assignments page.
///
/// Student-facing pages link each assignment; the instructor dashboard embeds
/// its table in a `data-react-props` JSON attribute. Both are read.
#[must_use]
pub fn parse_assignments(html: &str) -> Vec<Assignment> {
    let mut assignments: Vec<Assignment> = ASSIGNMENT_LINK_RE
        .captures_iter(html)
        .map(|caps| Assignment {
            id: caps[1].to_string(),
            title: unescape_html(caps[2].trim()),
        })
        .collect();

    for caps in REACT_PROPS_RE.captures_iter(html) {
        if let Ok(props) = serde_json::from_str::<Value>(&unescape_html(&caps[1])) {
            collect_react_assignments(&props, &mut assignments);
        }
    }

    let mut seen = HashSet::new();
    assignments.retain(|assignment| seen.insert(assignment.id.clone()));
    assignments
}

fn collect_react_assignments(value: &Value, out: &mut Vec<Assignment>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_react_assignments(item, out)),
        Value::Object(map) => {
            let title = map.get("title").and_then(Value::as_str);
            let id = ["id", "url"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find_map(|raw| ASSIGNMENT_ID_RE.captures(raw).map(|caps| caps[1].to_string()));
            if let (Some(title), Some(id)) = (title, id) {
                out.push(Assignment {
                    id,
                    title: title.to_string(),
                });
            } else {
                map.values().for_each(|child| collect_react_assignments(child, out));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT_PAGE: &str = r#"
        <div class="courseList">
          <div class="courseList--term pageSubheading">Fall 2024</div>
          <div class="courseList--coursesForTerm">
            <a class="courseBox" href="/courses/1234">
              <h3 class="courseBox--shortname">CS 101</h3>
              <div class="courseBox--name">Intro to Programming</div>
            </a>
            <a class="courseBox" href="/courses/5678">
              <h3 class="courseBox--shortname"></h3>
              <div class="courseBox--name">Data Structures &amp; Algorithms</div>
            </a>
          </div>
          <div class="courseList--term pageSubheading">Spring 2024</div>
          <div class="courseList--coursesForTerm">
            <a class="courseBox" href="/courses/42">
              <h3 class="courseBox--shortname">CS 200</h3>
            </a>
          </div>
        </div>"#;

    #[test]
    fn test_parse_account_courses_tracks_terms() {
        let courses = parse_account_courses(ACCOUNT_PAGE);
        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].id, "1234");
        assert_eq!(courses[0].name, "CS 101");
        assert_eq!(courses[0].term, "Fall 2024");
        assert_eq!(courses[1].name, "Data Structures & Algorithms");
        assert_eq!(courses[2].id, "42");
        assert_eq!(courses[2].term, "Spring 2024");
    }

    #[test]
    fn test_extract_tokens() {
        let html = r#"<meta name="csrf-token" content="abc+/=" />
            <input type="hidden" name="authenticity_token" value="tok&amp;1" />"#;
        assert_eq!(extract_authenticity_token(html).as_deref(), Some("tok&1"));
        assert_eq!(extract_csrf_token(html).as_deref(), Some("abc+/="));
        assert_eq!(
            extract_authenticity_token(r#"<meta name="csrf-token" content="only-meta">"#).as_deref(),
            Some("only-meta")
        );
    }

    #[test]
    fn test_parse_members_from_data_cm() {
        let html = r#"<button class="js-rosterName" data-cm="{&quot;email&quot;:&quot;jane@x.edu&quot;,&quot;id&quot;:77}">Jane</button>
            <button data-cm="{&quot;full_name&quot;:&quot;No Email&quot;}"></button>"#;
        let members = parse_members(html);
        assert_eq!(
            members,
            vec![Member {
                user_id: Some("77".to_string()),
                email: "jane@x.edu".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_members_falls_back_to_data_email() {
        let html = r#"<tr data-email="a@x.edu"></tr><tr data-email="b@x.edu"></tr>"#;
        let emails: Vec<String> = parse_members(html).into_iter().map(|m| m.email).collect();
        assert_eq!(emails, vec!["a@x.edu", "b@x.edu"]);
    }

    #[test]
    fn test_parse_assignments_from_links_and_react_props() {
        let html = r#"
            <a href="/courses/1234/assignments/11/submissions">hw4 written</a>
            <a href="/courses/1234/assignments/11">hw4 written</a>
            <div data-react-props="{&quot;table_data&quot;:[{&quot;id&quot;:&quot;assignment_12&quot;,&quot;title&quot;:&quot;hw4 code&quot;},{&quot;url&quot;:&quot;/courses/1234/assignments/13&quot;,&quot;title&quot;:&quot;hw5&quot;}]}"></div>"#;
        let assignments = parse_assignments(html);
        let pairs: Vec<(&str, &str)> = assignments
            .iter()
            .map(|a| (a.id.as_str(), a.title.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("11", "hw4 written"), ("12", "hw4 code"), ("13", "hw5")]
        );
    }

    #[test]
    fn test_extension_body_is_relative_days() {
        let body = extension_body("77", 3);
        assert_eq!(body["override"]["user_id"], 77);
        assert_eq!(body["override"]["settings"]["due_date"]["type"], "relative");
        assert_eq!(body["override"]["settings"]["due_date"]["value"]["days"], 3);
    }
}
