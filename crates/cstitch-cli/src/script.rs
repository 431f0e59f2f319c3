//! A line-oriented command interpreter over the paint engine, used for
//! interactive experimentation and golden-file testing (spec.md explicitly
//! keeps this kind of driver out of the core; it lives here as a thin
//! harness instead of a UI).
//!
//! One command per line, whitespace-separated. Blank lines and lines
//! starting with `#` are ignored. Unknown commands and malformed arguments
//! are reported to the output stream rather than aborting the script, so a
//! long script can be reviewed for every mistake in one run.

use std::io::{BufRead, Write};

use anyhow::Result;
use core_geom::Rect;
use core_paint::{AlwaysInteracts, Method, fracture_plane, merge_nm_tiles, paint_diagonal, paint_plane};
use core_plane::{CancellationToken, Direction, Plane, VecSink};
use tracing::info;

pub struct Session {
    plane: Option<Plane>,
    undo: VecSink,
    cancel: CancellationToken,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            plane: None,
            undo: VecSink::default(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Run every line of `input` as a command against a fresh [`Session`],
/// writing one line of output per command to `out`. Never returns an `Err`
/// for a malformed command line - that's reported to `out` instead, matching
/// the engine's own "no fatal errors at the surface" policy (spec §7).
pub fn run(input: impl BufRead, mut out: impl Write) -> Result<()> {
    let mut session = Session::default();
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match execute(&mut session, trimmed) {
            Ok(Some(msg)) => writeln!(out, "{msg}")?,
            Ok(None) => {}
            Err(e) => writeln!(out, "error at line {}: {e}", lineno + 1)?,
        }
    }
    Ok(())
}

fn execute(session: &mut Session, line: &str) -> Result<Option<String>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["new", x_lo, y_lo, x_hi, y_hi, ty] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let ty: u32 = ty.parse()?;
            session.plane = Some(Plane::new(rect, ty));
            info!(target: "cli.script", ?rect, ty, "plane_created");
            Ok(Some(format!("ok: new plane {rect:?}")))
        }
        ["paint", x_lo, y_lo, x_hi, y_hi, ty] | ["write", x_lo, y_lo, x_hi, y_hi, ty] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let ty: u32 = ty.parse()?;
            let Session { plane, undo, cancel } = session;
            let plane = require_plane(plane)?;
            paint_plane(plane, rect, &Method::Paint(ty), undo, cancel);
            Ok(Some(format!("ok: painted {rect:?} -> {ty}")))
        }
        ["xor", x_lo, y_lo, x_hi, y_hi, ty] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let ty: u32 = ty.parse()?;
            let Session { plane, undo, cancel } = session;
            let plane = require_plane(plane)?;
            paint_plane(plane, rect, &Method::Xor(ty), undo, cancel);
            Ok(Some(format!("ok: xor {rect:?} with {ty}")))
        }
        ["erase", x_lo, y_lo, x_hi, y_hi, target, background] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let target: u32 = target.parse()?;
            let background: u32 = background.parse()?;
            let Session { plane, undo, cancel } = session;
            let plane = require_plane(plane)?;
            paint_plane(plane, rect, &Method::Erase { target, background }, undo, cancel);
            Ok(Some(format!("ok: erased {target} from {rect:?} -> {background}")))
        }
        ["diagonal", x_lo, y_lo, x_hi, y_hi, dir, left, right] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let direction = parse_direction(dir)?;
            let left: u32 = left.parse()?;
            let right: u32 = right.parse()?;
            let Session { plane, undo, cancel } = session;
            let plane = require_plane(plane)?;
            paint_diagonal(plane, rect, direction, &Method::Paint(left), &Method::Paint(right), undo, cancel);
            Ok(Some(format!("ok: diagonal {rect:?} {dir} {left}/{right}")))
        }
        ["fracture", x_lo, y_lo, x_hi, y_hi] => {
            let rect = parse_rect(x_lo, y_lo, x_hi, y_hi)?;
            let Session { plane, undo, cancel } = session;
            let plane = require_plane(plane)?;
            fracture_plane(plane, rect, &AlwaysInteracts, undo, cancel);
            Ok(Some(format!("ok: fractured {rect:?}")))
        }
        ["mergenm"] => {
            let Session { plane, undo, .. } = session;
            let plane = require_plane(plane)?;
            let bounds = plane.bounds();
            let merges = merge_nm_tiles(plane, bounds, false, undo);
            Ok(Some(format!("ok: merged {merges} tile group(s)")))
        }
        ["mergenm", "once"] => {
            let Session { plane, undo, .. } = session;
            let plane = require_plane(plane)?;
            let bounds = plane.bounds();
            let merges = merge_nm_tiles(plane, bounds, true, undo);
            Ok(Some(format!("ok: merged {merges} tile group(s)")))
        }
        ["cancel"] => {
            session.cancel.cancel();
            Ok(Some("ok: cancellation requested".to_string()))
        }
        ["dump"] => {
            let plane = require_plane(&mut session.plane)?;
            let mut tiles: Vec<String> = plane
                .active_ids()
                .map(|id| {
                    let t = plane.get(id);
                    format!("{:?} {:?}", t.rect(), t.body())
                })
                .collect();
            tiles.sort();
            Ok(Some(tiles.join("\n")))
        }
        ["undo_count"] => Ok(Some(format!("{}", session.undo.events.len()))),
        other => Err(anyhow::anyhow!("unrecognized command: {:?}", other)),
    }
}

fn require_plane(plane: &mut Option<Plane>) -> Result<&mut Plane> {
    plane.as_mut().ok_or_else(|| anyhow::anyhow!("no plane: run `new` first"))
}

fn parse_rect(x_lo: &str, y_lo: &str, x_hi: &str, y_hi: &str) -> Result<Rect> {
    Ok(Rect::new(x_lo.parse()?, y_lo.parse()?, x_hi.parse()?, y_hi.parse()?))
}

fn parse_direction(s: &str) -> Result<Direction> {
    match s {
        "slash" => Ok(Direction::Slash),
        "backslash" => Ok(Direction::Backslash),
        other => Err(anyhow::anyhow!("unknown direction: {other}")),
    }
}
