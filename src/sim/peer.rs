/// Peer link: gossip of local results to the partner's client.
///
/// ## Messages
///   - `playerMove`          `{ playerId, position }`
///   - `bodyHoldInteraction` `{ questionId, anchorName }`
///
/// The two kinds are independent facts with no ordering guarantee between
/// them; receivers apply each idempotently.
///
/// ## Mailbox transport
///
/// `MailboxLink` stands in for a real relay with JSON files in a shared
/// directory, polled by both clients:
///   - `room_<CODE>.json`               `{ creator, partner, created_at }`
///   - `messages_<CODE>_<PEER>.json`    one outbox per peer, the last 100
///                                      envelopes it sent, each with a `seq`
///
/// Each outbox has exactly one writer, so two clients sending at once never
/// clobber each other. Polling reads the partner's outbox and remembers the
/// highest `seq` seen, so trimming old envelopes never replays anything.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::actor::{AnchorName, PlayerId};
use crate::domain::geom::Vec3;

const MAX_MESSAGES: usize = 100;
const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PEER_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PeerMessage {
    #[serde(rename_all = "camelCase")]
    PlayerMove { player_id: PlayerId, position: Vec3 },
    #[serde(rename_all = "camelCase")]
    BodyHoldInteraction { question_id: u8, anchor_name: AnchorName },
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("mailbox I/O: {0}")]
    Io(#[from] io::Error),
    #[error("mailbox JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("room {0} is full")]
    RoomFull(String),
    #[error("cannot join your own room")]
    OwnRoom,
}

/// Transport seam between the session and the partner's client.
pub trait PeerLink {
    /// Queue a message for the partner. A no-op while not connected.
    fn send_message(&mut self, message: &PeerMessage) -> Result<(), PeerError>;
    /// Messages from the partner since the last poll.
    fn poll_messages(&mut self) -> Result<Vec<PeerMessage>, PeerError>;
    fn is_connected(&self) -> bool;
    /// Stop polling and release the room.
    fn disconnect(&mut self) -> Result<(), PeerError>;
    /// Human-readable link state for the status line.
    fn describe(&self) -> String;
}

// ══════════════════════════════════════════════════════════════
// Offline (single terminal, both climbers local)
// ══════════════════════════════════════════════════════════════

pub struct OfflineLink;

impl PeerLink for OfflineLink {
    fn send_message(&mut self, _message: &PeerMessage) -> Result<(), PeerError> {
        Ok(())
    }
    fn poll_messages(&mut self) -> Result<Vec<PeerMessage>, PeerError> {
        Ok(Vec::new())
    }
    fn is_connected(&self) -> bool {
        false
    }
    fn disconnect(&mut self) -> Result<(), PeerError> {
        Ok(())
    }
    fn describe(&self) -> String {
        "local play".into()
    }
}

// ══════════════════════════════════════════════════════════════
// File mailbox
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RoomRecord {
    creator: String,
    partner: Option<String>,
    created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Envelope {
    seq: u64,
    from: String,
    timestamp: u64,
    message: PeerMessage,
}

pub struct MailboxLink {
    dir: PathBuf,
    room: String,
    peer_id: String,
    /// Known once the room has both seats filled.
    partner_id: Option<String>,
    connected: bool,
    /// Last `seq` written to our own outbox.
    sent_seq: u64,
    /// Last `seq` read from the partner's outbox.
    last_seq: u64,
}

impl MailboxLink {
    /// Open a new room and wait for a partner to join it.
    pub fn create_room<R: Rng>(dir: &Path, rng: &mut R) -> Result<Self, PeerError> {
        std::fs::create_dir_all(dir)?;
        let room = random_code(rng, ROOM_CODE_CHARS, ROOM_CODE_LEN);
        let peer_id = format!("player_{}", random_code(rng, PEER_ID_CHARS, 9));
        let record = RoomRecord { creator: peer_id.clone(), partner: None, created_at: now_millis() };
        let link = MailboxLink::new(dir, room, peer_id);
        write_json(&link.room_path(), &record)?;
        info!(room = %link.room, "room created, waiting for partner");
        Ok(link)
    }

    /// Join a room someone else created.
    pub fn join_room<R: Rng>(dir: &Path, code: &str, rng: &mut R) -> Result<Self, PeerError> {
        let peer_id = format!("player_{}", random_code(rng, PEER_ID_CHARS, 9));
        Self::join_as(dir, code, peer_id)
    }

    fn join_as(dir: &Path, code: &str, peer_id: String) -> Result<Self, PeerError> {
        let room = code.trim().to_uppercase();
        let mut link = MailboxLink::new(dir, room, peer_id);
        let path = link.room_path();
        let mut record: RoomRecord = match read_json(&path)? {
            Some(r) => r,
            None => return Err(PeerError::RoomNotFound(link.room)),
        };
        if record.creator == link.peer_id {
            return Err(PeerError::OwnRoom);
        }
        if record.partner.is_some() {
            return Err(PeerError::RoomFull(link.room));
        }
        record.partner = Some(link.peer_id.clone());
        write_json(&path, &record)?;
        // Skip history from before we arrived
        let inbox = link.outbox_path(&record.creator);
        link.last_seq = read_json::<Vec<Envelope>>(&inbox)?
            .and_then(|m| m.last().map(|e| e.seq))
            .unwrap_or(0);
        link.partner_id = Some(record.creator);
        link.connected = true;
        info!(room = %link.room, "joined room");
        Ok(link)
    }

    fn new(dir: &Path, room: String, peer_id: String) -> Self {
        MailboxLink {
            dir: dir.to_path_buf(),
            room,
            peer_id,
            partner_id: None,
            connected: false,
            sent_seq: 0,
            last_seq: 0,
        }
    }

    #[allow(dead_code)]
    pub fn room_code(&self) -> &str {
        &self.room
    }

    fn room_path(&self) -> PathBuf {
        self.dir.join(format!("room_{}.json", self.room))
    }

    fn outbox_path(&self, peer_id: &str) -> PathBuf {
        self.dir.join(format!("messages_{}_{}.json", self.room, peer_id))
    }

    /// Creator side: has the partner written themselves into the room yet?
    fn check_for_partner(&mut self) -> Result<(), PeerError> {
        if let Some(record) = read_json::<RoomRecord>(&self.room_path())? {
            if let (true, Some(partner)) = (record.creator == self.peer_id, record.partner) {
                self.partner_id = Some(partner);
                self.connected = true;
                info!(room = %self.room, "partner joined");
            }
        }
        Ok(())
    }
}

impl PeerLink for MailboxLink {
    fn send_message(&mut self, message: &PeerMessage) -> Result<(), PeerError> {
        if !self.connected {
            return Ok(());
        }
        let path = self.outbox_path(&self.peer_id);
        let mut messages: Vec<Envelope> = read_json(&path)?.unwrap_or_default();
        let seq = self.sent_seq + 1;
        messages.push(Envelope {
            seq,
            from: self.peer_id.clone(),
            timestamp: now_millis(),
            message: message.clone(),
        });
        if messages.len() > MAX_MESSAGES {
            let excess = messages.len() - MAX_MESSAGES;
            messages.drain(..excess);
        }
        write_json(&path, &messages)?;
        self.sent_seq = seq;
        debug!(seq, "peer message sent");
        Ok(())
    }

    fn poll_messages(&mut self) -> Result<Vec<PeerMessage>, PeerError> {
        if !self.connected {
            self.check_for_partner()?;
            if !self.connected {
                return Ok(Vec::new());
            }
        }
        let Some(partner) = &self.partner_id else {
            return Ok(Vec::new());
        };
        let envelopes: Vec<Envelope> = read_json(&self.outbox_path(partner))?.unwrap_or_default();
        let mut fresh = Vec::new();
        for env in envelopes {
            if env.seq <= self.last_seq || env.from == self.peer_id {
                continue;
            }
            self.last_seq = env.seq;
            fresh.push(env.message);
        }
        Ok(fresh)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) -> Result<(), PeerError> {
        for path in [self.room_path(), self.outbox_path(&self.peer_id)] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("could not remove {}: {e}", path.display()),
            }
        }
        self.connected = false;
        info!(room = %self.room, "left room");
        Ok(())
    }

    fn describe(&self) -> String {
        if self.connected {
            format!("room {} (partner connected)", self.room)
        } else {
            format!("room {} (waiting for partner)", self.room)
        }
    }
}

// ── Helpers ──

fn random_code<R: Rng>(rng: &mut R, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, PeerError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write via a temp file + rename so a polling peer never reads half a file.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PeerError> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec(value)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
