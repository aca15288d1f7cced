use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::models::{Game, GamePredictionResponse};
use crate::predictor::WinnerPredictor;
use crate::schedule::GameFetcher;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: GameFetcher,
    pub predictor: WinnerPredictor,
    pub max_games: usize,
}

/// Build the Axum router for the games board.
pub fn router(state: AppState, assets_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/predict/:game_id", get(predict_handler))
        .route("/api/games", get(games_handler))
        .route("/health", get(health_handler))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the board page with the current games rendered in.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let games = state.fetcher.get_upcoming_games(state.max_games).await;
    Html(render_index(&games))
}

/// GET /api/games
async fn games_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.fetcher.get_upcoming_games(state.max_games).await)
}

/// GET /predict/:game_id
///
/// Games are re-fetched on every call, so an ID from an earlier listing may
/// have rotated out.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Json<GamePredictionResponse> {
    let games = state.fetcher.get_upcoming_games(state.max_games).await;

    let Some(game) = games.into_iter().find(|g| g.game_id == game_id) else {
        info!("Prediction requested for unknown game {}", game_id);
        return Json(GamePredictionResponse::NotFound {
            error: "Game not found".to_string(),
        });
    };

    let prediction = state
        .predictor
        .predict_game_winner(&game.home_team, &game.away_team);
    Json(GamePredictionResponse::Found { game, prediction })
}

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": state.predictor.model_loaded(),
    }))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_game_card(game: &Game) -> String {
    format!(
        r#"<div class="game-card" data-game-id="{id}">
  <div class="meta">{date} · {time}</div>
  <div class="teams">
    <div class="team"><span class="abbr">{away_abbr}</span> {away}</div>
    <div class="at">@</div>
    <div class="team"><span class="abbr">{home_abbr}</span> {home}</div>
  </div>
  <button class="predict-btn" onclick="predict(this)">Predict winner</button>
  <div class="result"></div>
</div>"#,
        id = escape_html(&game.game_id),
        date = escape_html(&game.date),
        time = escape_html(&game.time),
        away_abbr = escape_html(&game.away_team_abbr),
        away = escape_html(&game.away_team),
        home_abbr = escape_html(&game.home_team_abbr),
        home = escape_html(&game.home_team),
    )
}

fn render_index(games: &[Game]) -> String {
    let cards: Vec<String> = games.iter().map(render_game_card).collect();
    INDEX_HTML.replace("{{GAMES}}", &cards.join("\n"))
}

/// Embedded single-file board (HTML + CSS + JS)
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Courtside · NBA Predictions</title>
<link rel="stylesheet" href="/assets/style.css">
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #ff7a1a;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 1.5rem; }
  .game-card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; display: grid; gap: .8rem; }
  .meta { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; }
  .teams { display: grid; gap: .3rem; }
  .team { font-size: 1.05rem; font-weight: 600; }
  .abbr { display: inline-block; min-width: 3rem; color: var(--accent); }
  .at { color: var(--muted); font-size: .8rem; }
  .predict-btn { background: none; border: 1px solid var(--border); color: var(--text); padding: .45rem .9rem; border-radius: 6px; cursor: pointer; }
  .predict-btn:hover { border-color: var(--accent); color: var(--accent); }
  .result { min-height: 1.2rem; font-size: .9rem; }
  .result.ok { color: var(--green); }
  .result.err { color: var(--red); }
</style>
</head>
<body>
<header><h1>🏀 Courtside</h1></header>
<main>
{{GAMES}}
</main>
<script>
async function predict(btn) {
  const card = btn.closest('.game-card');
  const out = card.querySelector('.result');
  out.className = 'result';
  out.textContent = 'Predicting…';
  try {
    const r = await fetch('/predict/' + encodeURIComponent(card.dataset.gameId));
    const body = await r.json();
    const p = body.prediction || body;
    if (p.error) {
      out.className = 'result err';
      out.textContent = p.error;
    } else {
      out.className = 'result ok';
      out.textContent = p.winner + ' (' + p.confidence.toFixed(1) + '% confidence)';
    }
  } catch (e) {
    out.className = 'result err';
    out.textContent = 'Request failed';
  }
}
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prediction;
    use crate::predictor::tests::StubClassifier;
    use crate::predictor::ModelHandle;
    use crate::schedule::tests::StaticProvider;
    use std::sync::atomic::Ordering;

    fn game(id: &str, home: &str, away: &str) -> Game {
        Game {
            game_id: id.into(),
            date: "2025-01-15".into(),
            time: "7:30 PM ET".into(),
            home_team: home.into(),
            away_team: away.into(),
            home_team_abbr: home[..3].to_uppercase(),
            away_team_abbr: away[..3].to_uppercase(),
        }
    }

    fn state(games: Option<Vec<Game>>, stub: Arc<StubClassifier>) -> Arc<AppState> {
        Arc::new(AppState {
            fetcher: GameFetcher::new(Arc::new(StaticProvider { games })),
            predictor: WinnerPredictor::new(ModelHandle::from_classifier(stub)),
            max_games: 4,
        })
    }

    #[tokio::test]
    async fn unknown_game_is_not_found_and_skips_predictor() {
        let stub = Arc::new(StubClassifier::new(1, Some(2.0)));
        let st = state(Some(vec![game("401", "Boston Celtics", "Miami Heat")]), stub.clone());

        let Json(resp) = predict_handler(State(st), Path("nope".to_string())).await;
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body, json!({ "error": "Game not found" }));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn known_game_returns_game_and_prediction() {
        let stub = Arc::new(StubClassifier::new(0, None));
        let st = state(Some(vec![game("401", "Boston Celtics", "Miami Heat")]), stub.clone());

        let Json(resp) = predict_handler(State(st), Path("401".to_string())).await;
        match resp {
            GamePredictionResponse::Found { game, prediction } => {
                assert_eq!(game.game_id, "401");
                assert_eq!(
                    prediction,
                    Prediction::Winner {
                        winner: "Miami Heat".into(),
                        confidence: 75.0,
                        note: "Using trained model".into(),
                    }
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sample_games_are_predictable_when_feed_is_down() {
        let stub = Arc::new(StubClassifier::new(1, Some(10.0)));
        let st = state(None, stub);

        let Json(resp) = predict_handler(State(st), Path("sample2".to_string())).await;
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body["game"]["home_team_abbr"], "BOS");
        assert_eq!(body["prediction"]["winner"], "Boston Celtics");
        assert_eq!(body["prediction"]["confidence"], 95.0);
    }

    #[tokio::test]
    async fn unloaded_model_error_is_nested_in_prediction() {
        let st = Arc::new(AppState {
            fetcher: GameFetcher::new(Arc::new(StaticProvider { games: None })),
            predictor: WinnerPredictor::new(ModelHandle::Unavailable),
            max_games: 4,
        });
        let Json(resp) = predict_handler(State(st), Path("sample1".to_string())).await;
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            body["prediction"],
            json!({ "error": "Model Prediction Failure - Model not loaded" })
        );
    }

    #[test]
    fn index_escapes_team_names() {
        let html = render_index(&[game("1", "<script>x", "Miami Heat")]);
        assert!(html.contains("&lt;script&gt;x"));
        assert!(!html.contains("<script>x"));
        assert!(html.contains(r#"data-game-id="1""#));
        assert!(!html.contains("{{GAMES}}"));
    }

    #[test]
    fn index_lists_every_game() {
        let html = render_index(&[
            game("1", "Boston Celtics", "Miami Heat"),
            game("2", "Denver Nuggets", "Phoenix Suns"),
        ]);
        assert_eq!(html.matches("class=\"game-card\"").count(), 2);
        assert!(html.contains("Denver Nuggets"));
    }
}
