//! Dashboard aggregates relating a player's mental state to their scoring.

use crate::{
    auth::Principal,
    dao::models::GameRecord,
    dto::insights::{Insight, InsightsResponse, RecentGame},
    error::ServiceError,
    state::SharedState,
};

const RECENT_GAMES: usize = 5;

/// Summarize the caller's games for the dashboard.
pub async fn dashboard(
    state: &SharedState,
    principal: &Principal,
) -> Result<InsightsResponse, ServiceError> {
    let records = state.store().list_games(principal.id).await?;
    Ok(summarize(&records))
}

/// Build the dashboard from games sorted most recent first.
pub fn summarize(records: &[GameRecord]) -> InsightsResponse {
    let points = |record: &&GameRecord| f64::from(record.game.points());
    let with_mental_state = records
        .iter()
        .filter_map(|record| record.mental_state.as_ref().map(|state| (record, state)))
        .collect::<Vec<_>>();

    let avg_points = mean(records.iter().map(|record| points(&record))).unwrap_or(0.0);
    let avg_confidence = mean(
        with_mental_state
            .iter()
            .map(|(_, state)| f64::from(state.confidence)),
    );
    let avg_sleep = mean(with_mental_state.iter().map(|(_, state)| state.sleep_hours));

    let bucket_points = |keep: &dyn Fn(f64, f64) -> bool| {
        mean(
            with_mental_state
                .iter()
                .filter(|(_, state)| keep(f64::from(state.confidence), state.sleep_hours))
                .map(|(record, _)| points(record)),
        )
    };

    let mut insights = Vec::new();
    if let (Some(high), Some(low)) = (
        bucket_points(&|confidence: f64, _: f64| confidence >= 8.0),
        bucket_points(&|confidence: f64, _: f64| confidence <= 5.0),
    ) {
        insights.push(Insight {
            title: "High Confidence Impact".into(),
            description: format!(
                "You average {:.1} points per game when confidence is 8+ vs {:.1} points when confidence is 5 or below",
                round1(high),
                round1(low)
            ),
        });
    }
    if let (Some(rested), Some(tired)) = (
        bucket_points(&|_: f64, sleep: f64| sleep >= 8.0),
        bucket_points(&|_: f64, sleep: f64| sleep < 7.0),
    ) {
        insights.push(Insight {
            title: "Sleep Impact".into(),
            description: format!(
                "You average {:.1} points per game with 8+ hours sleep vs {:.1} points with less than 7 hours",
                round1(rested),
                round1(tired)
            ),
        });
    }

    InsightsResponse {
        total_games: records.len(),
        avg_points: round1(avg_points),
        avg_confidence: avg_confidence.map(round1),
        avg_sleep: avg_sleep.map(round1),
        insights,
        recent_games: records
            .iter()
            .take(RECENT_GAMES)
            .map(|record| RecentGame::from(&record.game))
            .collect(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
