//! JSON-lines command session: one command object per input line, one reply
//! object per output line.

use std::io;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::engine::{EngineError, check_duration};
use crate::limits::MAX_LINE_LEN;
use crate::model::*;
use crate::observability::{SESSION_ERRORS_TOTAL, command_label};
use crate::plate::is_valid_plate;
use crate::pricing::Charges;
use crate::service::ParkingService;

/// Parsed command from one input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Allocate {
        zone_id: String,
        plate: String,
        hours: u32,
    },
    Release {
        request_id: Ulid,
    },
    Cancel {
        request_id: Ulid,
    },
    Occupy {
        request_id: Ulid,
    },
    Rollback {
        count: usize,
    },
    Quote {
        hours: u32,
    },
    Snapshot,
    Zones,
    Active,
    History,
    View,
    Operations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Reply {
    Request(Request),
    RolledBack { reverted: usize },
    Charges(Charges),
    Analytics(Analytics),
    Zones(Vec<Zone>),
    Requests(Vec<Request>),
    View(SystemView),
    Operations(Vec<Operation>),
    Error { kind: &'static str, message: String },
}

impl From<EngineError> for Reply {
    fn from(e: EngineError) -> Self {
        Reply::Error {
            kind: e.label(),
            message: e.to_string(),
        }
    }
}

fn reject(kind: &'static str, message: String) -> Reply {
    metrics::counter!(SESSION_ERRORS_TOTAL, "kind" => kind).increment(1);
    warn!("rejected command: {message}");
    Reply::Error { kind, message }
}

/// Run one command against the service.
pub async fn execute(service: &ParkingService, cmd: Command) -> Reply {
    debug!(op = command_label(&cmd), "executing command");
    match cmd {
        Command::Allocate {
            zone_id,
            plate,
            hours,
        } => {
            if !is_valid_plate(&plate) {
                return reject("invalid_plate", format!("invalid license plate: {plate:?}"));
            }
            service
                .allocate(&zone_id, &plate, hours)
                .await
                .map_or_else(Reply::from, Reply::Request)
        }
        Command::Release { request_id } => service
            .release(request_id)
            .await
            .map_or_else(Reply::from, Reply::Request),
        Command::Cancel { request_id } => service
            .cancel(request_id)
            .await
            .map_or_else(Reply::from, Reply::Request),
        Command::Occupy { request_id } => service
            .occupy(request_id)
            .await
            .map_or_else(Reply::from, Reply::Request),
        Command::Rollback { count } => service
            .rollback(count)
            .await
            .map_or_else(Reply::from, |reverted| Reply::RolledBack { reverted }),
        Command::Quote { hours } => {
            if let Err(e) = check_duration(hours) {
                return reject(e.label(), e.to_string());
            }
            Reply::Charges(service.compute_charges(hours))
        }
        Command::Snapshot => Reply::Analytics(service.snapshot().await),
        Command::Zones => Reply::Zones(service.list_zones().await),
        Command::Active => Reply::Requests(service.list_active_requests().await),
        Command::History => Reply::Requests(service.list_history_requests().await),
        Command::View => Reply::View(service.view().await),
        Command::Operations => Reply::Operations(service.operations().await),
    }
}

/// Serve commands from `reader` until EOF, writing one reply per non-blank line.
///
/// Malformed lines get an error reply and the session continues; an over-long
/// line or an I/O failure ends it.
pub async fn process_session<R, W>(
    reader: R,
    writer: W,
    service: Arc<ParkingService>,
) -> Result<(), LinesCodecError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_LEN));
    let mut replies = FramedWrite::new(writer, LinesCodec::new());

    while let Some(line) = lines.next().await {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(text) {
            Ok(cmd) => execute(&service, cmd).await,
            Err(e) => reject("malformed", format!("malformed command: {e}")),
        };
        let encoded = serde_json::to_string(&reply)
            .map_err(|e| LinesCodecError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        replies.send(encoded).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::limits::MAX_DURATION_HOURS;

    fn service() -> ParkingService {
        ParkingService::from_config(&Config::default())
    }

    #[test]
    fn parse_commands() {
        let cmd: Command =
            serde_json::from_str(r#"{"op":"allocate","zone_id":"zone-1","plate":"ab-12","hours":3}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::Allocate {
                zone_id: "zone-1".into(),
                plate: "ab-12".into(),
                hours: 3,
            }
        );

        let id = Ulid::new();
        let cmd: Command =
            serde_json::from_str(&format!(r#"{{"op":"release","request_id":"{id}"}}"#)).unwrap();
        assert_eq!(cmd, Command::Release { request_id: id });

        let cmd: Command = serde_json::from_str(r#"{"op":"snapshot"}"#).unwrap();
        assert_eq!(cmd, Command::Snapshot);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(serde_json::from_str::<Command>(r#"{"op":"teleport"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"op":"release","request_id":"nope"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"op":"allocate","zone_id":"zone-1"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"op":"quote","hours":-1}"#).is_err());
    }

    #[test]
    fn reply_shape() {
        let json = serde_json::to_value(Reply::RolledBack { reverted: 2 }).unwrap();
        assert_eq!(json["type"], "rolled_back");
        assert_eq!(json["data"]["reverted"], 2);

        let json = serde_json::to_value(Reply::from(EngineError::NoSlotAvailable)).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["kind"], "no_slot");
    }

    #[tokio::test]
    async fn invalid_plate_never_reaches_engine() {
        let svc = service();
        let reply = execute(
            &svc,
            Command::Allocate {
                zone_id: "zone-1".into(),
                plate: "X".into(),
                hours: 1,
            },
        )
        .await;
        assert!(matches!(reply, Reply::Error { kind: "invalid_plate", .. }));
        assert!(svc.operations().await.is_empty());
    }

    #[tokio::test]
    async fn quote_matches_tariff() {
        let svc = service();
        let reply = execute(&svc, Command::Quote { hours: 3 }).await;
        match reply {
            Reply::Charges(c) => assert_eq!(c.total, 17.0),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn quote_refuses_unbookable_durations() {
        let svc = service();
        let reply = execute(&svc, Command::Quote { hours: 0 }).await;
        assert!(matches!(reply, Reply::Error { kind: "limit_exceeded", .. }));

        let reply = execute(&svc, Command::Quote { hours: MAX_DURATION_HOURS }).await;
        assert!(matches!(reply, Reply::Charges(_)));

        // Same bound and error kind as an allocation of that length.
        let too_long = MAX_DURATION_HOURS + 1;
        let quote = execute(&svc, Command::Quote { hours: too_long }).await;
        assert!(matches!(quote, Reply::Error { kind: "limit_exceeded", .. }));
        let allocate = execute(
            &svc,
            Command::Allocate {
                zone_id: "zone-1".into(),
                plate: "AB12".into(),
                hours: too_long,
            },
        )
        .await;
        assert!(matches!(allocate, Reply::Error { kind: "limit_exceeded", .. }));
    }

    #[tokio::test]
    async fn unknown_request_is_error_reply() {
        let svc = service();
        let reply = execute(&svc, Command::Cancel { request_id: Ulid::new() }).await;
        assert!(matches!(reply, Reply::Error { kind: "not_found", .. }));
    }
}
