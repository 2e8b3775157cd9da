//! Socket check: open, send, deadline-bounded drain, close, statistics.
//!
//! The harness sends a plain HTTP/1.1 GET and counts response bytes; the
//! response is never parsed.

use hostcap_core::socket::{SocketMode, SocketProtocol, SocketTable};

use crate::config::HarnessConfig;
use crate::drain::drain_with_budget;
use crate::outcome::CheckOutcome;

const CHECK: &str = "sockets";

/// The request the probe writes to its peer.
#[must_use]
pub fn probe_request(host: &str) -> String {
    format!(
        "GET / HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: hostcap-harness/{}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Drive one client socket through its whole lifecycle against the
/// configured peer. Steps that need a reachable peer are skipped when
/// `skip_network` is set or the connection cannot be established.
pub fn run(config: &HarnessConfig, sockets: &SocketTable) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let id = sockets.create(
        SocketMode::Client,
        SocketProtocol::Tcp,
        &config.host,
        config.port,
    );
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "socket_create",
        format!("{id} -> {}:{}", config.host, config.port),
    ));
    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "socket_mode",
        sockets.mode_label(id),
    ));
    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "socket_protocol",
        sockets.protocol_label(id),
    ));

    if config.skip_network {
        for operation in [
            "socket_open",
            "socket_send",
            "socket_receive",
            "socket_close",
            "socket_stats",
        ] {
            outcomes.push(CheckOutcome::skip(CHECK, operation, "network disabled"));
        }
        let _ = sockets.free(id);
        return outcomes;
    }

    match sockets.open(id) {
        Ok(true) => outcomes.push(CheckOutcome::pass(
            CHECK,
            "socket_open",
            format!(
                "connected, state {}, descriptor {}",
                sockets.state_label(id).unwrap_or("?"),
                sockets.descriptor(id).unwrap_or(-1)
            ),
        )),
        Ok(false) => {
            outcomes.push(CheckOutcome::skip(
                CHECK,
                "socket_open",
                format!("{}:{} unreachable", config.host, config.port),
            ));
            for operation in ["socket_send", "socket_receive", "socket_close", "socket_stats"] {
                outcomes.push(CheckOutcome::skip(CHECK, operation, "no connection"));
            }
            let _ = sockets.free(id);
            return outcomes;
        }
        Err(err) => {
            outcomes.push(CheckOutcome::fail(CHECK, "socket_open", err.to_string()));
            let _ = sockets.free(id);
            return outcomes;
        }
    }

    let request = probe_request(&config.host);
    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "socket_send",
        sockets
            .send(id, request.as_bytes())
            .map(|written| format!("sent {written} of {} bytes", request.len())),
    ));

    let drained = drain_with_budget(
        |chunk_size, remaining| sockets.receive(id, chunk_size, remaining),
        config.chunk_size,
        config.budget_secs,
    );
    outcomes.push(match drained {
        Ok(summary) => CheckOutcome::pass(
            CHECK,
            "socket_receive",
            format!(
                "received {} bytes in {} attempts ({})",
                summary.buffer.len(),
                summary.calls,
                summary.termination.as_str()
            ),
        ),
        Err(err) => CheckOutcome::fail(CHECK, "socket_receive", err.to_string()),
    });

    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "socket_close",
        sockets.close(id).map(|closed| format!("closed: {closed}")),
    ));

    outcomes.push(match sockets.stats(id) {
        Ok(stats) => CheckOutcome::pass(
            CHECK,
            "socket_stats",
            format!(
                "sent {}B in {}/{} writes, received {}B in {}/{} reads, \
                 read {:.6}s, write {:.6}s",
                stats.bytes_sent,
                stats.writes_completed,
                stats.writes_attempted,
                stats.bytes_received,
                stats.reads_completed,
                stats.reads_attempted,
                stats.total_read_time.as_secs_f64(),
                stats.total_write_time.as_secs_f64(),
            ),
        ),
        Err(err) => CheckOutcome::fail(CHECK, "socket_stats", err.to_string()),
    });

    if let Err(err) = sockets.free(id) {
        outcomes.push(CheckOutcome::fail(CHECK, "socket_free", err.to_string()));
    }

    outcomes
}
