use mockito::Matcher;
use std::time::Duration;
use subcorpus::{
    HarvestError, HarvestOptions, PeriodMode, PushshiftClient, Region, RetryPolicy, SearchService, SubmissionQuery,
    COMMENT_COLUMNS, SUBMISSION_FIELDS,
};

fn client_for(server: &mockito::Server, page_size: usize) -> PushshiftClient {
    let opts = HarvestOptions::default()
        .with_api_base(server.url())
        .with_page_size(page_size)
        .with_retry(RetryPolicy { attempts: 3, initial: Duration::from_millis(5), max: Duration::from_millis(20) });
    PushshiftClient::new(&opts).unwrap()
}

/// Match on the path prefix; query parameters are checked separately.
fn path(p: &str) -> Matcher {
    Matcher::Regex(format!("^{p}"))
}

/// Submission search sends window, fields and keyword, and reads the `data` envelope.
#[test]
fn submission_search_single_page() {
    let mut server = mockito::Server::new();
    let window = Region::Canada.window(PeriodMode::Precovid);
    let m = server
        .mock("GET", path("/reddit/search/submission/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("subreddit".into(), "canada".into()),
            Matcher::UrlEncoded("q".into(), "mask".into()),
            Matcher::UrlEncoded("size".into(), "5".into()),
            Matcher::UrlEncoded("after".into(), window.after.to_string()),
            Matcher::UrlEncoded("before".into(), window.before.to_string()),
            Matcher::UrlEncoded("fields".into(), "id,num_comments,created_utc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"a1","num_comments":4,"created_utc":1579000000},{"id":"a2","num_comments":0,"created_utc":1578000000}]}"#)
        .create();

    let client = client_for(&server, 100);
    let q = SubmissionQuery { subreddit: "canada", query: "mask", limit: 5, window, fields: &SUBMISSION_FIELDS };
    let posts = client.search_submissions(&q).unwrap();

    m.assert();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "a1");
    assert_eq!(posts[0].num_comments, 4);
}

/// Full pages continue from the oldest timestamp seen until the limit is met.
#[test]
fn submission_search_paginates_backwards() {
    let mut server = mockito::Server::new();
    let window = Region::Ireland.window(PeriodMode::Postcovid);
    let first = server
        .mock("GET", path("/reddit/search/submission/"))
        .match_query(Matcher::UrlEncoded("before".into(), window.before.to_string()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"a","num_comments":2,"created_utc":1584000000},{"id":"b","num_comments":3,"created_utc":1583000000}]}"#)
        .create();
    let second = server
        .mock("GET", path("/reddit/search/submission/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("before".into(), "1583000001".into()),
            Matcher::UrlEncoded("size".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c","num_comments":5,"created_utc":1582990000}]}"#)
        .create();

    let client = client_for(&server, 2);
    let q = SubmissionQuery { subreddit: "ireland", query: "", limit: 3, window, fields: &SUBMISSION_FIELDS };
    let posts = client.search_submissions(&q).unwrap();

    first.assert();
    second.assert();
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

/// Posts sharing the oldest second of a full page are still reached on the next page,
/// and the overlap is not returned twice.
#[test]
fn submission_search_keeps_posts_sharing_a_timestamp() {
    let mut server = mockito::Server::new();
    let window = Region::Ireland.window(PeriodMode::Postcovid);
    let first = server
        .mock("GET", path("/reddit/search/submission/"))
        .match_query(Matcher::UrlEncoded("before".into(), window.before.to_string()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"a","num_comments":2,"created_utc":1584000000},{"id":"b","num_comments":3,"created_utc":1583000000}]}"#)
        .create();
    let second = server
        .mock("GET", path("/reddit/search/submission/"))
        .match_query(Matcher::UrlEncoded("before".into(), "1583000001".into()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"b","num_comments":3,"created_utc":1583000000},{"id":"c","num_comments":4,"created_utc":1583000000}]}"#)
        .create();

    let client = client_for(&server, 2);
    let q = SubmissionQuery { subreddit: "ireland", query: "", limit: 10, window, fields: &SUBMISSION_FIELDS };
    let posts = client.search_submissions(&q).unwrap();

    first.assert();
    second.assert();
    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

/// One comment-id request per submission, concatenated in order.
#[test]
fn comment_ids_per_submission() {
    let mut server = mockito::Server::new();
    let a = server
        .mock("GET", "/reddit/submission/comment_ids/s1")
        .with_status(200)
        .with_body(r#"{"data":["c1","c2"]}"#)
        .create();
    let b = server
        .mock("GET", "/reddit/submission/comment_ids/s2")
        .with_status(200)
        .with_body(r#"{"data":["c3"]}"#)
        .create();

    let client = client_for(&server, 100);
    let ids = client.search_comment_ids(&["s1".to_string(), "s2".to_string()]).unwrap();
    a.assert();
    b.assert();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
}

/// Comment lookup by ids with the four output fields.
#[test]
fn comments_by_ids() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "c1,c2".into()),
            Matcher::UrlEncoded("fields".into(), "author,body,created_utc,permalink,id".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"data":[
                {"id":"c1","author":"alice","body":"hi","created_utc":1580000000,"permalink":"/r/x/1"},
                {"id":"c2","author":"[deleted]","body":"gone","created_utc":1580000001,"permalink":"/r/x/2"}
            ]}"#,
        )
        .create();

    let client = client_for(&server, 100);
    let comments = client.search_comments(&["c1".to_string(), "c2".to_string()], &COMMENT_COLUMNS).unwrap();
    m.assert();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author.as_deref(), Some("alice"));
    assert!(comments[1].is_deleted_author());
}

/// Ids the archive leaves out of a response are asked for again.
#[test]
fn short_comment_response_requests_the_rest() {
    let mut server = mockito::Server::new();
    let all = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::UrlEncoded("ids".into(), "c1,c2,c3".into()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c1","author":"a","body":"one"},{"id":"c2","author":"b","body":"two"}]}"#)
        .expect(1)
        .create();
    let rest = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::UrlEncoded("ids".into(), "c3".into()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c3","author":"c","body":"three"}]}"#)
        .expect(1)
        .create();

    let client = client_for(&server, 100);
    let ids = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
    let comments = client.search_comments(&ids, &COMMENT_COLUMNS).unwrap();
    all.assert();
    rest.assert();
    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
}

/// Requests never carry more ids than the page size.
#[test]
fn comment_lookup_is_split_by_page_size() {
    let mut server = mockito::Server::new();
    let first = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ids".into(), "c1,c2".into()),
            Matcher::UrlEncoded("size".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c1","body":"one"},{"id":"c2","body":"two"}]}"#)
        .expect(1)
        .create();
    let second = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::UrlEncoded("ids".into(), "c3".into()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c3","body":"three"}]}"#)
        .expect(1)
        .create();

    let client = client_for(&server, 2);
    let ids = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
    let comments = client.search_comments(&ids, &COMMENT_COLUMNS).unwrap();
    first.assert();
    second.assert();
    assert_eq!(comments.len(), 3);
}

/// An id the archive never returns is given up on after a fruitless round, not looped on.
#[test]
fn missing_comment_gives_up_after_empty_round() {
    let mut server = mockito::Server::new();
    let all = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::UrlEncoded("ids".into(), "c1,c2".into()))
        .with_status(200)
        .with_body(r#"{"data":[{"id":"c1","body":"one"}]}"#)
        .expect(1)
        .create();
    let retry = server
        .mock("GET", path("/reddit/search/comment/"))
        .match_query(Matcher::UrlEncoded("ids".into(), "c2".into()))
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .expect(1)
        .create();

    let client = client_for(&server, 100);
    let ids = vec!["c1".to_string(), "c2".to_string()];
    let comments = client.search_comments(&ids, &COMMENT_COLUMNS).unwrap();
    all.assert();
    retry.assert();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, "c1");
}

/// 429 is retried with backoff; the next success is returned.
#[test]
fn rate_limited_request_is_retried() {
    let mut server = mockito::Server::new();
    let limited = server
        .mock("GET", "/reddit/submission/comment_ids/s1")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create();
    let ok = server
        .mock("GET", "/reddit/submission/comment_ids/s1")
        .with_status(200)
        .with_body(r#"{"data":["c1"]}"#)
        .create();

    let client = client_for(&server, 100);
    let ids = client.search_comment_ids(&["s1".to_string()]).unwrap();
    assert_eq!(ids, vec!["c1"]);
    limited.assert();
    ok.assert();
}

/// Persistent 5xx gives up after the configured attempts with a Remote error.
#[test]
fn server_errors_exhaust_retries() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/reddit/submission/comment_ids/s1")
        .with_status(503)
        .expect(3)
        .create();

    let client = client_for(&server, 100);
    let err = client.search_comment_ids(&["s1".to_string()]).unwrap_err();
    m.assert();
    assert!(matches!(err, HarvestError::Remote(ref msg) if msg.contains("503")), "{err}");
}

/// Client errors other than 429 are not retried.
#[test]
fn not_found_fails_immediately() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/reddit/submission/comment_ids/missing")
        .with_status(404)
        .expect(1)
        .create();

    let client = client_for(&server, 100);
    let err = client.search_comment_ids(&["missing".to_string()]).unwrap_err();
    m.assert();
    assert!(matches!(err, HarvestError::Remote(_)));
}
