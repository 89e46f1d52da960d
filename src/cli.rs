use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use social_forum_frontend::{
    ApiClient, ClientConfig, IdentityStore, MemoryStorage, Transport, DEFAULT_API_URL,
    USERNAME_LOCAL_STORAGE_KEY,
};

use crate::file_storage::FileStorage;

#[derive(Debug, Parser)]
#[command(name = "social-forum", about = "Read and write the social forum from a terminal")]
pub struct Cli {
    /// Base URL of the forum REST API
    #[arg(long, env = "SOCIAL_FORUM_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File that stands in for browser local storage
    #[arg(long, env = "SOCIAL_FORUM_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Local storage key holding the active identity
    #[arg(long, default_value = USERNAME_LOCAL_STORAGE_KEY)]
    pub storage_key: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Use USERNAME for everything that follows
    Login { username: String },
    Logout,
    /// Print the active identity
    Whoami,
    Health,
    /// List all posts
    Posts,
    Post { post_id: String },
    CreatePost { content: String },
    UpdatePost { post_id: String, content: String },
    DeletePost { post_id: String },
    Like { post_id: String },
    Unlike { post_id: String },
    /// List the comments of a post
    Comments { post_id: String },
    Comment { post_id: String, content: String },
    UpdateComment {
        post_id: String,
        comment_id: String,
        content: String,
    },
    DeleteComment { post_id: String, comment_id: String },
}

impl Cli {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.as_str()).with_storage_key(self.storage_key.as_str())
    }

    pub fn identity_store(&self) -> IdentityStore {
        let config = self.config();
        match self.storage.clone().or_else(FileStorage::default_path) {
            Some(path) => IdentityStore::with_key(FileStorage::new(path), config.storage_key),
            None => {
                log::warn!("no config directory; identity will not be kept between runs");
                IdentityStore::with_key(MemoryStorage::new(), config.storage_key)
            }
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::from_config(&cli.config(), Rc::new(cli.identity_store()));
    let output = execute(&client, cli.command).await?;
    println!("{}", output);
    Ok(())
}

/// Runs one command and renders its result as pretty JSON.
pub async fn execute<T: Transport>(client: &ApiClient<T>, command: Command) -> Result<String> {
    match command {
        Command::Login { username } => {
            let identity = client
                .identity()
                .login(&username)
                .context("could not store identity")?;
            info!("logged in as {}", identity.username);
            render(&identity)
        }
        Command::Logout => {
            client
                .identity()
                .logout()
                .context("could not clear identity")?;
            render(&serde_json::Value::Null)
        }
        Command::Whoami => render(&client.identity().current_identity()),
        Command::Health => render(&client.health().await.context("health check failed")?),
        Command::Posts => render(&client.list_posts().await.context("could not list posts")?),
        Command::Post { post_id } => render(
            &client
                .get_post(&post_id)
                .await
                .with_context(|| format!("could not fetch post {}", post_id))?,
        ),
        Command::CreatePost { content } => {
            let username = active_username(client)?;
            render(
                &client
                    .create_post(&content, &username)
                    .await
                    .context("could not create post")?,
            )
        }
        Command::UpdatePost { post_id, content } => {
            let username = active_username(client)?;
            render(
                &client
                    .update_post(&post_id, &content, &username)
                    .await
                    .with_context(|| format!("could not update post {}", post_id))?,
            )
        }
        Command::DeletePost { post_id } => {
            client
                .delete_post(&post_id)
                .await
                .with_context(|| format!("could not delete post {}", post_id))?;
            render(&serde_json::Value::Null)
        }
        Command::Like { post_id } => {
            let username = active_username(client)?;
            render(
                &client
                    .like_post(&post_id, &username)
                    .await
                    .with_context(|| format!("could not like post {}", post_id))?,
            )
        }
        Command::Unlike { post_id } => {
            client
                .unlike_post(&post_id)
                .await
                .with_context(|| format!("could not unlike post {}", post_id))?;
            render(&serde_json::Value::Null)
        }
        Command::Comments { post_id } => render(
            &client
                .list_comments(&post_id)
                .await
                .with_context(|| format!("could not list comments of post {}", post_id))?,
        ),
        Command::Comment { post_id, content } => {
            let username = active_username(client)?;
            render(
                &client
                    .create_comment(&post_id, &content, &username)
                    .await
                    .with_context(|| format!("could not comment on post {}", post_id))?,
            )
        }
        Command::UpdateComment {
            post_id,
            comment_id,
            content,
        } => {
            let username = active_username(client)?;
            render(
                &client
                    .update_comment(&post_id, &comment_id, &content, &username)
                    .await
                    .with_context(|| format!("could not update comment {}", comment_id))?,
            )
        }
        Command::DeleteComment {
            post_id,
            comment_id,
        } => {
            client
                .delete_comment(&post_id, &comment_id)
                .await
                .with_context(|| format!("could not delete comment {}", comment_id))?;
            render(&serde_json::Value::Null)
        }
    }
}

fn active_username<T: Transport>(client: &ApiClient<T>) -> Result<String> {
    client
        .identity()
        .current_identity()
        .map(|identity| identity.username)
        .ok_or_else(|| anyhow!("not logged in; run `social-forum login <username>` first"))
}

fn render<V: Serialize>(value: &V) -> Result<String> {
    serde_json::to_string_pretty(value).context("could not render result")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_ids() {
        let cli = Cli::try_parse_from([
            "social-forum",
            "--api-url",
            "http://forum.test",
            "update-comment",
            "p1",
            "c1",
            "new text",
        ])
        .unwrap();

        assert_eq!(cli.config().base_url, "http://forum.test");
        assert_eq!(cli.config().storage_key, "user");
        match cli.command {
            Command::UpdateComment {
                post_id,
                comment_id,
                content,
            } => {
                assert_eq!(post_id, "p1");
                assert_eq!(comment_id, "c1");
                assert_eq!(content, "new text");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    fn offline_client() -> ApiClient {
        ApiClient::from_config(
            &ClientConfig::default(),
            Rc::new(IdentityStore::new(MemoryStorage::new())),
        )
    }

    #[tokio::test]
    async fn writes_need_an_identity() {
        let client = offline_client();

        let err = execute(
            &client,
            Command::CreatePost {
                content: "hi".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not logged in"));
    }

    #[tokio::test]
    async fn login_and_whoami_use_the_store() {
        let client = offline_client();

        execute(&client, Command::Login { username: " eve ".into() })
            .await
            .unwrap();
        let whoami = execute(&client, Command::Whoami).await.unwrap();
        assert!(whoami.contains(r#""username": "eve""#));

        execute(&client, Command::Logout).await.unwrap();
        assert_eq!(execute(&client, Command::Whoami).await.unwrap(), "null");
    }
}
