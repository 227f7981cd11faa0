use serde_json::Value;

use ghwatch_core::{Feed, Notification};

/// Why an event produced no notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The event kind has no mapping. Expected, not a fault.
    #[error("{feed} event kind {kind:?} not supported")]
    Unsupported { feed: Feed, kind: String },
    /// A recognized kind is missing a field the mapping needs.
    #[error("{kind} event is missing {field}")]
    MissingField { kind: String, field: &'static str },
}

/// Map one raw event to a notification.
pub fn classify(feed: Feed, event: &Value) -> Result<Notification, ClassifyError> {
    let kind = event
        .get(feed.kind_field())
        .and_then(Value::as_str)
        .unwrap_or_default();

    match (feed, kind) {
        (Feed::Activity, "PushEvent") => push(event, kind),
        (Feed::Activity, "PullRequestReviewEvent") => pull_request_review(event, kind),
        (Feed::Activity, "PullRequestReviewCommentEvent") => review_comment(event, kind),
        (Feed::Activity, "PullRequestEvent") => pull_request(event, kind),
        (Feed::Activity, "IssueCommentEvent") => issue_comment(event, kind),
        (Feed::IssueEvents, "head_ref_force_pushed") => force_pushed(event, kind),
        _ => Err(ClassifyError::Unsupported {
            feed,
            kind: kind.to_string(),
        }),
    }
}

/// [`classify`], logging the reason when the event is skipped.
pub fn classify_event(feed: Feed, event: &Value) -> Option<Notification> {
    classify(feed, event)
        .inspect_err(|e| log_skipped(feed, event_id(event).as_deref(), e))
        .ok()
}

/// Log a skipped event: unsupported kinds at debug, malformed ones at warn.
pub(crate) fn log_skipped(feed: Feed, id: Option<&str>, err: &ClassifyError) {
    match err {
        ClassifyError::Unsupported { .. } => tracing::debug!(%feed, ?id, "{err}"),
        ClassifyError::MissingField { .. } => {
            tracing::warn!(%feed, ?id, "Skipping malformed event: {err}")
        },
    }
}

/// The event id as a string. `/events` sends strings, `/issues/events`
/// sends numbers; both compare by their decimal text.
pub fn event_id(event: &Value) -> Option<String> {
    match event.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn push(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let commit = event
        .pointer("/payload/commits/0")
        .ok_or_else(|| missing(kind, "payload.commits[0]"))?;
    let message = required_str(commit, "/message", kind, "payload.commits[0].message")?;
    let url = required_str(commit, "/url", kind, "payload.commits[0].url")?;

    Ok(Notification::new(
        format!("Push by {actor}"),
        message,
        Some(url.to_string()),
    ))
}

fn pull_request_review(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let number = pr_number(event, kind)?;
    let action = required_str(event, "/payload/action", kind, "payload.action")?;
    let body = nullable_str(event, "/payload/review/body", kind, "payload.review.body")?;
    let url = required_str(
        event,
        "/payload/review/html_url",
        kind,
        "payload.review.html_url",
    )?;

    Ok(Notification::new(
        format!("PR #{number} review {action} by {actor}"),
        body,
        Some(url.to_string()),
    ))
}

fn review_comment(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let number = pr_number(event, kind)?;
    let action = required_str(event, "/payload/action", kind, "payload.action")?;
    let body = nullable_str(event, "/payload/comment/body", kind, "payload.comment.body")?;
    let url = required_str(
        event,
        "/payload/comment/html_url",
        kind,
        "payload.comment.html_url",
    )?;

    Ok(Notification::new(
        format!("PR #{number} review comment {action} by {actor}"),
        body,
        Some(url.to_string()),
    ))
}

fn pull_request(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let number = pr_number(event, kind)?;
    let action = required_str(event, "/payload/action", kind, "payload.action")?;
    let title = required_str(
        event,
        "/payload/pull_request/title",
        kind,
        "payload.pull_request.title",
    )?;
    let url = required_str(
        event,
        "/payload/pull_request/html_url",
        kind,
        "payload.pull_request.html_url",
    )?;

    Ok(Notification::new(
        format!("PR #{number} {action} by {actor}"),
        title,
        Some(url.to_string()),
    ))
}

fn issue_comment(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let body = nullable_str(event, "/payload/comment/body", kind, "payload.comment.body")?;
    let url = required_str(
        event,
        "/payload/comment/html_url",
        kind,
        "payload.comment.html_url",
    )?;

    Ok(Notification::new(
        format!("New comment by {actor}"),
        body,
        Some(url.to_string()),
    ))
}

fn force_pushed(event: &Value, kind: &str) -> Result<Notification, ClassifyError> {
    let actor = actor(event, kind)?;
    let number = event
        .pointer("/issue/number")
        .and_then(Value::as_u64)
        .ok_or_else(|| missing(kind, "issue.number"))?;
    let title = required_str(event, "/issue/title", kind, "issue.title")?;
    let url = required_str(event, "/issue/html_url", kind, "issue.html_url")?;

    Ok(Notification::new(
        format!("{actor} force pushed PR #{number}"),
        title,
        Some(url.to_string()),
    ))
}

fn actor<'a>(event: &'a Value, kind: &str) -> Result<&'a str, ClassifyError> {
    required_str(event, "/actor/login", kind, "actor.login")
}

fn pr_number(event: &Value, kind: &str) -> Result<u64, ClassifyError> {
    event
        .pointer("/payload/pull_request/number")
        .and_then(Value::as_u64)
        .ok_or_else(|| missing(kind, "payload.pull_request.number"))
}

fn required_str<'a>(
    value: &'a Value,
    pointer: &str,
    kind: &str,
    field: &'static str,
) -> Result<&'a str, ClassifyError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(kind, field))
}

/// Free text GitHub sends as `null` when empty (e.g. an approval without a
/// comment). An absent key is still an error.
fn nullable_str(
    value: &Value,
    pointer: &str,
    kind: &str,
    field: &'static str,
) -> Result<String, ClassifyError> {
    match value.pointer(pointer) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Ok(String::new()),
        _ => Err(missing(kind, field)),
    }
}

fn missing(kind: &str, field: &'static str) -> ClassifyError {
    ClassifyError::MissingField {
        kind: kind.to_string(),
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghwatch_core::test_helpers::*;
    use serde_json::json;

    #[test]
    fn push_event_uses_first_commit() {
        let mut event = push_event("3", "al", "fix", "u3");
        event["payload"]["commits"]
            .as_array_mut()
            .unwrap()
            .push(json!({"message": "second", "url": "u4"}));
        let n = classify(Feed::Activity, &event).unwrap();
        assert_eq!(n, Notification::new("Push by al", "fix", Some("u3".into())));
    }

    #[test]
    fn push_event_without_commits_is_malformed() {
        let mut event = push_event("3", "al", "fix", "u3");
        event["payload"]["commits"] = json!([]);
        assert_eq!(
            classify(Feed::Activity, &event),
            Err(ClassifyError::MissingField {
                kind: "PushEvent".into(),
                field: "payload.commits[0]"
            })
        );
    }

    #[test]
    fn pull_request_event_title() {
        let event = pull_request_event("9", "bob", 42, "opened");
        let n = classify(Feed::Activity, &event).unwrap();
        assert_eq!(n.title, "PR #42 opened by bob");
        assert_eq!(n.body, "Change #42");
        assert_eq!(n.url.as_deref(), Some("https://github.com/o/r/pull/42"));
    }

    #[test]
    fn pull_request_review_event() {
        let event = json!({
            "id": "10",
            "type": "PullRequestReviewEvent",
            "actor": {"login": "carol"},
            "payload": {
                "action": "created",
                "pull_request": {"number": 7},
                "review": {"body": "Looks good", "html_url": "https://r/7#review"}
            }
        });
        let n = classify(Feed::Activity, &event).unwrap();
        assert_eq!(n.title, "PR #7 review created by carol");
        assert_eq!(n.body, "Looks good");
        assert_eq!(n.url.as_deref(), Some("https://r/7#review"));
    }

    #[test]
    fn review_with_null_body_has_empty_body() {
        let event = json!({
            "id": "10",
            "type": "PullRequestReviewEvent",
            "actor": {"login": "carol"},
            "payload": {
                "action": "created",
                "pull_request": {"number": 7},
                "review": {"body": null, "html_url": "https://r/7#review"}
            }
        });
        assert_eq!(classify(Feed::Activity, &event).unwrap().body, "");
    }

    #[test]
    fn review_comment_event() {
        let event = json!({
            "id": "11",
            "type": "PullRequestReviewCommentEvent",
            "actor": {"login": "dan"},
            "payload": {
                "action": "created",
                "pull_request": {"number": 8},
                "comment": {"body": "nit: rename", "html_url": "https://r/8#c"}
            }
        });
        let n = classify(Feed::Activity, &event).unwrap();
        assert_eq!(n.title, "PR #8 review comment created by dan");
        assert_eq!(n.body, "nit: rename");
    }

    #[test]
    fn issue_comment_event_title() {
        let event = issue_comment_event("12", "erin", "+1");
        let n = classify(Feed::Activity, &event).unwrap();
        assert_eq!(n.title, "New comment by erin");
        assert_eq!(n.body, "+1");
    }

    #[test]
    fn force_push_issue_event() {
        let event = force_push_event(555, "frank", 99, "Rework parser");
        let n = classify(Feed::IssueEvents, &event).unwrap();
        assert_eq!(n.title, "frank force pushed PR #99");
        assert_eq!(n.body, "Rework parser");
        assert_eq!(n.url.as_deref(), Some("https://github.com/o/r/pull/99"));
    }

    #[test]
    fn kinds_are_feed_specific() {
        let push = push_event("1", "al", "m", "u");
        assert!(matches!(
            classify(Feed::IssueEvents, &push),
            Err(ClassifyError::Unsupported { .. })
        ));
        let force = force_push_event(1, "al", 1, "t");
        assert!(matches!(
            classify(Feed::Activity, &force),
            Err(ClassifyError::Unsupported { .. })
        ));
    }

    #[test]
    fn unsupported_kind() {
        let event = unsupported_event("1", "WatchEvent");
        assert_eq!(
            classify(Feed::Activity, &event),
            Err(ClassifyError::Unsupported {
                feed: Feed::Activity,
                kind: "WatchEvent".into()
            })
        );
        assert!(classify_event(Feed::Activity, &event).is_none());
    }

    #[test]
    fn missing_actor_is_malformed() {
        let mut event = pull_request_event("9", "bob", 42, "opened");
        event.as_object_mut().unwrap().remove("actor");
        assert_eq!(
            classify(Feed::Activity, &event),
            Err(ClassifyError::MissingField {
                kind: "PullRequestEvent".into(),
                field: "actor.login"
            })
        );
        assert!(classify_event(Feed::Activity, &event).is_none());
    }

    #[test]
    fn missing_comment_body_key_is_malformed() {
        let mut event = issue_comment_event("12", "erin", "+1");
        event["payload"]["comment"]
            .as_object_mut()
            .unwrap()
            .remove("body");
        assert!(matches!(
            classify(Feed::Activity, &event),
            Err(ClassifyError::MissingField {
                field: "payload.comment.body",
                ..
            })
        ));
    }

    #[test]
    fn event_ids_normalize_strings_and_numbers() {
        assert_eq!(event_id(&json!({"id": "123"})).as_deref(), Some("123"));
        assert_eq!(event_id(&json!({"id": 123})).as_deref(), Some("123"));
        assert_eq!(event_id(&json!({"id": ""})), None);
        assert_eq!(event_id(&json!({"id": null})), None);
        assert_eq!(event_id(&json!({})), None);
    }
}
