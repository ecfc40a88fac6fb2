use std::io::{BufRead, Write};
use std::time::Instant;

use arena::{GameSession, IllegalTransition, Phase};
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::protocol::{Request, Response};
use crate::recording::Recorder;

/// Serves requests until [`Request::Bye`] or the end of the input.
///
/// Each request is applied to the session at the instant returned by `now`.
/// Returns an error only on I/O failure; malformed requests and illegal
/// commands are answered with an error response.
pub fn serve<G: Rng>(
    session: &mut GameSession<G>,
    mut input: impl BufRead,
    mut output: impl Write,
    recorder: &mut Option<Recorder>,
    mut now: impl FnMut() -> Instant,
) -> anyhow::Result<()> {
    let mut buf = String::new();
    loop {
        buf.clear();
        let num_bytes_read = input.read_line(&mut buf)?;
        if num_bytes_read == 0 {
            debug!("End of input");
            break;
        }
        let line = buf.trim_end();
        if line.is_empty() {
            continue;
        }
        trace!(request = %line, "Received request");

        let request = match serde_json::from_str::<Request>(line) {
            Ok(Request::Bye) => break,
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "Malformed request");
                write_response(&mut output, &Response::error(err))?;
                continue;
            }
        };
        let recorded_request = match recorder {
            Some(_) => Some(serde_json::to_value(&request)?),
            None => None,
        };

        let phase_before = session.phase();
        let response = match apply(session, request, now()) {
            Ok(()) => Response::State(session.state()),
            Err(err) => {
                info!(%err, "Rejected command");
                Response::error(err)
            }
        };
        write_response(&mut output, &response)?;

        if let (Some(recorder), Some(request)) = (recorder.as_mut(), recorded_request) {
            recorder.store_exchange(request, serde_json::to_value(&response)?);
            if phase_before != Phase::Ended && session.phase() == Phase::Ended {
                let path = recorder.write_match_recording()?;
                info!(path = %path.display(), "Recorded match");
            }
        }
    }

    if let Some(recorder) = recorder {
        if recorder.has_pending() {
            let path = recorder.write_match_recording()?;
            info!(path = %path.display(), "Recorded unfinished match");
        }
    }
    Ok(())
}

fn apply<G: Rng>(
    session: &mut GameSession<G>,
    request: Request,
    now: Instant,
) -> Result<(), IllegalTransition> {
    match request {
        Request::Start => session.start(now),
        Request::Pause => session.pause(now)?,
        Request::Resume => session.resume(now)?,
        Request::Stop => session.stop(now)?,
        Request::Snapshot(snapshot) => {
            if session.tick(snapshot, now) {
                info!("Game over");
            }
        }
        Request::State | Request::Bye => {}
    }
    Ok(())
}

fn write_response(output: &mut impl Write, response: &Response) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use arena::GameConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};

    use super::*;

    fn config() -> GameConfig {
        serde_json::from_value(json!({
            "game": "mine",
            "game_time": 10,
            "robots": { "1": { "name": "Alpha" }, "2": { "name": "Beta" } },
            "teams": [
                { "name": "team1", "robot": 1, "color": "red", "basket": "red_basket" },
                { "name": "team2", "robot": 2, "color": "blue", "basket": "blue_basket" }
            ],
            "points": { "good": 10, "bad": -5 },
            "robot_time": 30,
            "charging_time": 5,
            "charging_amount": 5,
            "fields": [
                { "name": "red_basket", "points": [[0, 0], [10, 0], [10, 10], [0, 10]] },
                { "name": "blue_basket", "points": [[90, 0], [100, 0], [100, 10], [90, 10]] },
                { "name": "charging_station", "points": [[40, 0], [50, 0], [50, 10], [40, 10]] }
            ],
            "charging_stations": ["charging_station"]
        }))
        .unwrap()
    }

    /// Runs the requests, one second apart, and returns the responses.
    fn run(requests: &[&str], recorder: &mut Option<Recorder>) -> Vec<Value> {
        let t0 = Instant::now();
        let mut session = GameSession::new(config(), StdRng::seed_from_u64(5), t0).unwrap();
        let input = requests.join("\n");
        let mut output = Vec::new();
        let mut tick = 0;
        serve(
            &mut session,
            Cursor::new(input),
            &mut output,
            recorder,
            || {
                tick += 1;
                t0 + Duration::from_secs(tick)
            },
        )
        .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn one_response_per_request() {
        let responses = run(
            &[
                r#"{"type": "State"}"#,
                r#"{"type": "Start"}"#,
                r#"{"type": "Snapshot", "objects": {"good_ore": {"3": {"position": [5, 5]}}}}"#,
                r#"{"type": "Pause"}"#,
                r#"{"type": "Bye"}"#,
                r#"{"type": "State"}"#,
            ],
            &mut None,
        );
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["running"], false);
        assert_eq!(responses[1]["timeLeft"], 10);
        assert_eq!(responses[2]["teams"]["team1"]["score"], 10);
        assert_eq!(responses[2]["timeLeft"], 9);
        assert_eq!(responses[3]["paused"], true);
    }

    #[test]
    fn robot_on_a_station_is_charging() {
        let responses = run(
            &[
                r#"{"type": "Start"}"#,
                r#"{"type": "Snapshot", "robots": {"1": {"position": [45, 5]}, "2": {"position": [95, 5]}}}"#,
            ],
            &mut None,
        );
        assert_eq!(responses.len(), 2);
        let state = &responses[1];
        assert_eq!(state["teams"]["team1"]["charging"], true);
        assert_eq!(state["teams"]["team2"]["charging"], false);
        assert_eq!(state["robots"]["1"]["position"], json!([45.0, 5.0]));
    }

    #[test]
    fn errors_are_reported_and_serving_continues() {
        let responses = run(
            &[
                r#"{"type": "Resume"}"#,
                "not json",
                "",
                r#"{"type": "Start"}"#,
            ],
            &mut None,
        );
        assert_eq!(responses.len(), 3);
        assert_eq!(
            responses[0]["error"],
            "Cannot resume the game while it is idle"
        );
        assert!(responses[1]["error"].is_string());
        assert_eq!(responses[2]["running"], true);
    }

    #[test]
    fn finished_matches_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = Some(Recorder::new(dir.path().to_path_buf()).unwrap());
        let mut requests = vec![r#"{"type": "Start"}"#];
        // The game lasts ten seconds, one request per second
        requests.extend(std::iter::repeat(r#"{"type": "Snapshot"}"#).take(10));
        requests.push(r#"{"type": "Start"}"#);
        let responses = run(&requests, &mut recorder);
        assert_eq!(responses[10]["running"], false);
        assert_eq!(responses[10]["timeLeft"], 0);

        let first = dir.path().join("match_000001.json");
        let recording: Value =
            serde_json::from_str(&std::fs::read_to_string(first).unwrap()).unwrap();
        assert_eq!(recording.as_array().unwrap().len(), 11);
        // The second, unfinished match is flushed at the end of the input
        assert!(dir.path().join("match_000002.json").exists());
    }
}
