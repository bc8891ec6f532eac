use ghapi_http::{
    endpoints::{self, SearchRepositories},
    ApiCaller,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    name: String,
    html_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let caller = ApiCaller::from_env()?;

    let response = caller
        .send(endpoints::search_repositories(&SearchRepositories {
            sort: Some("stars".to_owned()),
            per_page: Some(5),
            ..SearchRepositories::new("machine learning")
        }))
        .await?;

    let page: SearchPage = response.json()?;
    for repo in page.items {
        println!("{} {}", repo.name, repo.html_url);
    }
    if let Some(next) = response.next_page_url() {
        println!("next page: {next}");
    }

    Ok(())
}
