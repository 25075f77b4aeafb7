//! Slide sequencing over the three-panel strip (previous / current / next).
//!
//! A move is split in two: `begin` reserves the transition and tells the
//! caller where to animate the strip; `finish` commits the new index once
//! the animation has completed. Only one transition may be in flight, and
//! each carries an id so a late `finish` can only commit its own move.

use std::future::Future;
use std::pin::pin;
use futures::future::{select, Either};
use crate::config::{STRIP_NEXT_PCT, STRIP_PREVIOUS_PCT};
use crate::gallery::Gallery;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Strip offset (percent) that brings the target panel into view.
    pub fn strip_target_pct(self) -> f64 {
        match self {
            Direction::Previous => STRIP_PREVIOUS_PCT,
            Direction::Next => STRIP_NEXT_PCT,
        }
    }
}

/// A materialised panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    pub index: usize,
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// The only slides that exist at any time; everything else is torn down.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelWindow {
    pub previous: Option<Slide>,
    pub current: Option<Slide>,
    pub next: Option<Slide>,
}

impl PanelWindow {
    pub fn around(gallery: &Gallery, index: usize) -> Self {
        let slide = |i: usize| {
            gallery.get(i).map(|img| Slide {
                index: i,
                src: img.source_path.clone(),
                width: img.width,
                height: img.height,
            })
        };
        Self {
            previous: index.checked_sub(1).and_then(slide),
            current: slide(index),
            next: index.checked_add(1).and_then(slide),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrowVisibility {
    pub previous: bool,
    pub next: bool,
}

impl ArrowVisibility {
    pub const HIDDEN: Self = Self { previous: false, next: false };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub id: u64,
    pub direction: Direction,
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Debug)]
pub struct SlideSequencer {
    len: usize,
    current: usize,
    in_flight: Option<Transition>,
    next_id: u64,
}

impl SlideSequencer {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0, in_flight: None, next_id: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn in_flight(&self) -> Option<Transition> {
        self.in_flight
    }

    /// Reposition without animation (viewer opening). Rejected while a
    /// transition is in flight or when out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len || self.in_flight.is_some() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn has_neighbour(&self, direction: Direction) -> bool {
        match direction {
            Direction::Previous => self.current > 0,
            Direction::Next => self.current + 1 < self.len,
        }
    }

    /// Reserve a transition. `None` at a boundary, while zoomed, or while
    /// another transition is still running; nothing is queued.
    pub fn begin(&mut self, direction: Direction, zoomed: bool) -> Option<Transition> {
        if zoomed || self.in_flight.is_some() || !self.has_neighbour(direction) {
            return None;
        }
        let to = match direction {
            Direction::Previous => self.current - 1,
            Direction::Next => self.current + 1,
        };
        self.next_id += 1;
        let transition = Transition { id: self.next_id, direction, from: self.current, to };
        self.in_flight = Some(transition);
        Some(transition)
    }

    /// Commit the in-flight transition if it is the one `id` names. A
    /// stale id (abandoned move, or a newer one already running) is ignored.
    pub fn finish(&mut self, id: u64) -> Option<Transition> {
        if self.in_flight?.id != id {
            return None;
        }
        let transition = self.in_flight.take()?;
        self.current = transition.to;
        Some(transition)
    }

    /// Forget the in-flight transition without moving.
    pub fn abandon(&mut self) -> Option<Transition> {
        self.in_flight.take()
    }

    pub fn arrows(&self, zoomed: bool) -> ArrowVisibility {
        if zoomed {
            return ArrowVisibility::HIDDEN;
        }
        ArrowVisibility {
            previous: self.has_neighbour(Direction::Previous),
            next: self.has_neighbour(Direction::Next),
        }
    }

    pub fn counter_text(&self) -> String {
        format!("{} / {}", self.current + 1, self.len)
    }

    pub fn window(&self, gallery: &Gallery) -> PanelWindow {
        PanelWindow::around(gallery, self.current)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEnd {
    Signaled,
    TimedOut,
}

/// Resolve on whichever comes first: the animation's completion signal or
/// the fallback timeout. A detached element never signals; the timeout
/// keeps the sequencer moving.
pub async fn wait_for_transition<S, T>(signal: S, timeout: T) -> TransitionEnd
where
    S: Future<Output = ()>,
    T: Future<Output = ()>,
{
    let signal = pin!(signal);
    let timeout = pin!(timeout);
    match select(signal, timeout).await {
        Either::Left(_) => TransitionEnd::Signaled,
        Either::Right(_) => {
            log::debug!("Strip transition did not signal completion; continuing after timeout");
            TransitionEnd::TimedOut
        }
    }
}
