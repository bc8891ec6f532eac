use std::time::Duration;

use ghapi_http::{
    endpoints::{self, CommitFilter, SearchRepositories},
    ApiCaller, ApiError, RetryPolicy,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let caller = ApiCaller::from_env()?;
    let retry = RetryPolicy::new(5, Duration::from_secs(1));

    let (search, commits, contents) = tokio::join!(
        caller.call(
            endpoints::search_repositories(&SearchRepositories {
                per_page: Some(3),
                ..SearchRepositories::new("machine learning")
            }),
            &retry,
        ),
        caller.call(
            endpoints::list_commits(
                "octocat",
                "Hello-World",
                &CommitFilter {
                    per_page: Some(3),
                    ..CommitFilter::default()
                },
            ),
            &retry,
        ),
        caller.call(
            endpoints::get_contents("octocat", "Hello-World", "", None),
            &retry,
        ),
    );

    for (label, result) in [("search", search), ("commits", commits), ("contents", contents)] {
        match result {
            Ok(response) => println!(
                "{label}: {} after {} attempt(s), {} bytes",
                response.status,
                response.attempts,
                response.body.len()
            ),
            Err(err @ ApiError::Auth { .. }) => eprintln!("{label}: fix your credentials: {err}"),
            Err(err @ ApiError::RetryExhausted { .. }) => {
                eprintln!("{label}: try again later: {err}")
            }
            Err(err) => eprintln!("{label}: {err}"),
        }
    }

    let limits = caller.rate_limit().await?;
    println!("rate limit: {}", limits.text()?);

    Ok(())
}
