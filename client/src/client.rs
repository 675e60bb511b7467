use hintsweeper_common::{models::CreateResponse, params::ParamsRequest, results::ScoreboardView};
use reqwest::Client;
use url::Url;

use crate::Result;

/// HTTP side of the hintsweeper server: creating rooms and reading their
/// scoreboards.
pub struct HintsweeperClient {
    client: Client,
    base_url: Url,
}

impl HintsweeperClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::new();

        Ok(Self { client, base_url })
    }

    /// Create a room. The server clamps whatever it is given and answers
    /// with the parameters it actually used.
    pub async fn create_game(&self, params: impl Into<ParamsRequest>) -> Result<CreateResponse> {
        let create_url = self.base_url.join("/create")?;

        let response = self
            .client
            .post(create_url)
            .json(&params.into())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Failed to create game: {}", response.status()).into());
        }

        Ok(response.json().await?)
    }

    pub async fn scoreboard(&self, game_id: &str) -> Result<ScoreboardView> {
        let mut url = self.base_url.join("/scoreboard")?;
        url.query_pairs_mut().append_pair("id", game_id);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Failed to fetch scoreboard: {}", response.status()).into());
        }

        Ok(response.json().await?)
    }

    pub fn websocket_url(&self, game_id: &str) -> Result<String> {
        let mut ws_url = self.base_url.clone();
        ws_url
            .set_scheme(match self.base_url.scheme() {
                "https" => "wss",
                _ => "ws",
            })
            .map_err(|_| "Failed to set WebSocket scheme")?;
        ws_url.set_path("/ws");
        ws_url.query_pairs_mut().clear().append_pair("id", game_id);

        Ok(ws_url.to_string())
    }
}
