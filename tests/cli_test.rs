use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;

fn command(url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("movies-service"));
    cmd.env_remove("MOVIE_INFO_URL")
        .env_remove("REVIEWS_URL")
        .arg("--movie-info-url")
        .arg(format!("{}/v1/movieinfos", url))
        .arg("--reviews-url")
        .arg(format!("{}/v1/reviews", url))
        .arg("--retry-delay-ms")
        .arg("10");
    cmd
}

#[test]
fn test_movie_command_prints_aggregate() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_movie = server
        .mock("GET", "/v1/movieinfos/1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "movieInfoId": "1",
                "name": "Batman Begins",
                "year": 2005,
                "cast": ["Christian Bale"],
                "releaseDate": "2005-06-15"
            }"#,
        )
        .create();

    let _mock_reviews = server
        .mock("GET", "/v1/reviews")
        .match_query(Matcher::UrlEncoded("movieInfoId".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"reviewId": "1", "movieInfoId": 1, "comment": "Awesome Movie", "rating": 9.0}]"#,
        )
        .create();

    command(&url)
        .arg("movie")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batman Begins"))
        .stdout(predicate::str::contains("Awesome Movie"));
}

#[test]
fn test_movie_command_reports_not_found() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_movie = server
        .mock("GET", "/v1/movieinfos/1")
        .with_status(404)
        .create();

    command(&url)
        .arg("movie")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"))
        .stderr(predicate::str::contains(
            "There is no MovieInfo available for the passed in Id : 1",
        ));
}

#[test]
fn test_stream_command_prints_ndjson() {
    let mut server = Server::new();
    let url = server.url();

    let _mock_stream = server
        .mock("GET", "/v1/movieinfos/stream")
        .with_status(200)
        .with_header("content-type", "application/x-ndjson")
        .with_body(concat!(
            r#"{"movieInfoId":"1","name":"Batman Begins","year":2005,"cast":["Christian Bale"],"releaseDate":"2005-06-15"}"#,
            "\n",
            r#"{"movieInfoId":"2","name":"The Dark Knight","year":2008,"cast":["Heath Ledger"],"releaseDate":"2008-07-18"}"#,
            "\n",
        ))
        .create();

    command(&url)
        .arg("stream")
        .arg("--limit")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Batman Begins"))
        .stdout(predicate::str::contains("The Dark Knight").not());
}
