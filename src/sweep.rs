use std::collections::{BinaryHeap, HashMap, HashSet};
use std::iter::once;

use geo::{Coordinate, Line};
use itertools::Itertools;
use log::{debug, trace};
use slab::Slab;
use smallvec::SmallVec;

use crate::active::ActiveList;
use crate::error::Error;
use crate::events::{Event, EventKind, SweepPoint};
use crate::intersection::{segment_crossing, SegmentCrossing};
use crate::segment::Segment;
use crate::tolerance::Tolerance;

/// A reported intersection: the point and the distinct input segments
/// passing through it.
#[derive(Debug, Clone)]
pub struct Intersection {
    /// The untruncated computed intersection point.
    pub point: Coordinate<f64>,
    /// The input segments through the point, in arbitrary order.
    pub segments: Vec<Line<f64>>,
}

type Pair = (usize, usize);
type PairList = SmallVec<[Pair; 2]>;

/// Bentley–Ottmann sweep over a set of input segments.
///
/// [`new`] validates the input and seeds the endpoint events; [`run`]
/// drains the event heap to completion. The sweep advances strictly
/// left to right; at every step the active list holds the segments
/// currently intersecting the sweep line in ascending y-order, and
/// candidate crossings are only ever tested between list neighbors.
/// Vertical and horizontal segments have no usable position-indexed
/// order and live in a separate special set, tested against every
/// newly-started segment instead.
///
/// [`new`]: Sweep::new
/// [`run`]: Sweep::run
pub struct Sweep {
    tol: Tolerance,
    segments: Slab<Segment>,
    events: BinaryHeap<Event>,
    /// Crossing events scheduled but not yet processed, by quantized
    /// point and normalized pair.
    pending: HashSet<((i64, i64), Pair)>,
    active: ActiveList,
    specials: Vec<usize>,
    registry: HashMap<SweepPoint, PairList>,
    position: Option<SweepPoint>,
}

impl Sweep {
    /// Validate the input and build the endpoint event queue.
    ///
    /// Rejects non-finite coordinates, zero-length segments and
    /// duplicates (equal endpoints within tolerance) before the sweep
    /// starts; a duplicate pair has no well-defined order on the sweep
    /// line.
    pub fn new<I>(lines: I, tol: Tolerance) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Line<f64>>,
    {
        let iter = lines.into_iter();
        let size = {
            let (min_size, max_size) = iter.size_hint();
            max_size.unwrap_or(min_size)
        };

        let mut segments = Slab::with_capacity(size);
        let mut events = BinaryHeap::with_capacity(2 * size);
        let mut seen = HashSet::with_capacity(size);
        for line in iter {
            if ![line.start.x, line.start.y, line.end.x, line.end.y]
                .iter()
                .all(|c| c.is_finite())
            {
                return Err(Error::NonFiniteCoordinate(line));
            }
            let segment = Segment::new(line, &tol);
            if segment.left() == segment.right() {
                return Err(Error::DegenerateSegment(line));
            }
            if !seen.insert(segment.quantized()) {
                return Err(Error::DuplicateSegments(line));
            }

            let key = segments.insert(segment);
            let segment = &segments[key];
            events.push(Event {
                point: segment.left(),
                kind: EventKind::Start { segment: key },
            });
            events.push(Event {
                point: segment.right(),
                kind: EventKind::End { segment: key },
            });
        }

        Ok(Sweep {
            tol,
            segments,
            events,
            pending: HashSet::new(),
            active: ActiveList::default(),
            specials: Vec::new(),
            registry: HashMap::new(),
            position: None,
        })
    }

    /// Run the sweep to completion.
    ///
    /// Returns the intersections in sweep order (ascending x, then y),
    /// each with the distinct segments passing through it.
    pub fn run(mut self) -> Result<Vec<Intersection>, Error> {
        while let Some(event) = self.events.pop() {
            self.handle_event(event)?;
            if cfg!(any(test, feature = "slow-asserts")) {
                if let Some(pos) = self.position {
                    self.active.assert_order(&self.segments, pos.x(), &self.tol);
                }
            }
        }
        Ok(self.into_output())
    }

    fn handle_event(&mut self, event: Event) -> Result<(), Error> {
        trace!("handling event: {:?}", event);
        self.position = Some(event.point);
        match event.kind {
            EventKind::Start { segment } => self.handle_start(event.point, segment),
            EventKind::End { segment } => self.handle_end(segment),
            EventKind::Crossing { upper, lower } => self.handle_crossing(event.point, upper, lower),
        }
    }

    fn handle_start(&mut self, point: SweepPoint, key: usize) -> Result<(), Error> {
        // Crossings involving an axis-parallel segment never re-order
        // the active list, so both directions are recorded straight into
        // the registry: the starting segment against every tracked
        // special here, and a starting special against every active
        // segment below.
        let specials: Vec<usize> = self.specials.clone();
        for special in specials {
            self.record_direct(key, special)?;
        }

        if self.segments[key].is_axis_parallel() {
            let actives: Vec<usize> = self.active.iter().collect();
            for other in actives {
                self.record_direct(key, other)?;
            }
            self.specials.push(key);
        } else {
            let idx = self.active.insert(key, &self.segments, point.x(), &self.tol);
            debug!(
                "start: {:?} enters the active list at {}",
                self.segments[key], idx
            );
            let below = self.active.below(idx);
            let above = self.active.above(idx);
            for other in below.into_iter().chain(above.into_iter()) {
                self.try_schedule(key, other)?;
            }
        }
        Ok(())
    }

    fn handle_end(&mut self, key: usize) -> Result<(), Error> {
        if self.segments[key].is_axis_parallel() {
            if let Some(at) = self.specials.iter().position(|&k| k == key) {
                self.specials.swap_remove(at);
            }
            return Ok(());
        }

        let idx = self
            .active
            .remove(key)
            .expect("ended segment missing from the active list");
        debug!("end: {:?} leaves the active list", self.segments[key]);

        // The neighbors either side of the removed segment are adjacent
        // now; their crossing, if any, becomes relevant.
        if idx > 0 {
            if let (Some(below), Some(above)) = (self.active.get(idx - 1), self.active.get(idx)) {
                self.try_schedule(below, above)?;
            }
        }
        Ok(())
    }

    fn handle_crossing(&mut self, point: SweepPoint, upper: usize, lower: usize) -> Result<(), Error> {
        let pair = normalize(upper, lower);
        self.pending.remove(&(point.key(), pair));
        self.record_pair(point, pair);
        debug!(
            "crossing at {:?}: {:?} x {:?}",
            point, self.segments[upper], self.segments[lower]
        );

        // The sweep has passed the point: ranks of everything through it
        // reverse.
        self.active
            .reorder_through(point.x(), point.y(), &self.segments, &self.tol);

        // The pair members sit next to new neighbors; test both sides
        // for crossings beyond this point.
        for &key in &[upper, lower] {
            if let Some(idx) = self.active.index_of(key) {
                let below = self.active.below(idx);
                let above = self.active.above(idx);
                for other in below.into_iter().chain(above.into_iter()) {
                    self.try_schedule(key, other)?;
                }
            }
        }
        Ok(())
    }

    /// Intersection test with at least one axis-parallel operand; point
    /// hits go straight into the registry.
    fn record_direct(&mut self, a: usize, b: usize) -> Result<(), Error> {
        match segment_crossing(&self.segments[a], &self.segments[b], &self.tol) {
            Some(SegmentCrossing::Point(p)) => {
                let point = SweepPoint::new(p, &self.tol);
                debug!(
                    "direct crossing at {:?}: {:?} x {:?}",
                    point, self.segments[a], self.segments[b]
                );
                self.record_pair(point, normalize(a, b));
                Ok(())
            }
            Some(SegmentCrossing::Overlap(..)) => Err(self.overlap_error(a, b)),
            None => Ok(()),
        }
    }

    /// Test a pair of active segments and schedule a crossing event if
    /// the crossing lies ahead of the sweep and is not already known.
    fn try_schedule(&mut self, a: usize, b: usize) -> Result<(), Error> {
        let crossing = match segment_crossing(&self.segments[a], &self.segments[b], &self.tol) {
            Some(SegmentCrossing::Point(p)) => p,
            Some(SegmentCrossing::Overlap(..)) => return Err(self.overlap_error(a, b)),
            None => return Ok(()),
        };

        let point = SweepPoint::new(crossing, &self.tol);
        if !self.is_ahead(point) {
            trace!("crossing {:?} is behind the sweep; dropped", point);
            return Ok(());
        }
        let pair = normalize(a, b);
        if self.pending.contains(&(point.key(), pair)) {
            return Ok(());
        }
        if self
            .registry
            .get(&point)
            .map_or(false, |pairs| pairs.contains(&pair))
        {
            return Ok(());
        }

        // Record which of the pair is currently upper; the crossing
        // handler re-tests exactly those two against their post-crossing
        // neighbors.
        let (upper, lower) = match (self.active.index_of(a), self.active.index_of(b)) {
            (Some(ia), Some(ib)) if ia < ib => (b, a),
            _ => (a, b),
        };
        debug!(
            "scheduling crossing at {:?}: {:?} over {:?}",
            point, self.segments[upper], self.segments[lower]
        );
        self.pending.insert((point.key(), pair));
        self.events.push(Event {
            point,
            kind: EventKind::Crossing { upper, lower },
        });
        Ok(())
    }

    /// A crossing is schedulable if it lies strictly ahead of the sweep,
    /// or at the current x with a y not yet passed. Anything else is an
    /// event in the past, which floating error in the solve could
    /// otherwise produce.
    fn is_ahead(&self, point: SweepPoint) -> bool {
        match self.position {
            None => true,
            Some(pos) => {
                let (px, py) = point.key();
                let (cx, cy) = pos.key();
                px > cx || (px == cx && py >= cy)
            }
        }
    }

    fn record_pair(&mut self, point: SweepPoint, pair: Pair) {
        let pairs = self.registry.entry(point).or_default();
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    fn overlap_error(&self, a: usize, b: usize) -> Error {
        Error::OverlappingSegments(self.segments[a].line(), self.segments[b].line())
    }

    /// Project the registry into the output mapping: each point with the
    /// distinct segments through it, in sweep order.
    fn into_output(self) -> Vec<Intersection> {
        let Sweep {
            segments, registry, ..
        } = self;

        let mut entries: Vec<(SweepPoint, PairList)> = registry.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
            .into_iter()
            .map(|(point, pairs)| Intersection {
                point: point.coord(),
                segments: pairs
                    .into_iter()
                    .flat_map(|(a, b)| once(a).chain(once(b)))
                    .unique()
                    .map(|key| segments[key].line())
                    .collect(),
            })
            .collect()
    }
}

fn normalize(a: usize, b: usize) -> Pair {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use geo::{Line, Rect};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::random::uniform_line;

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn lines(input: &[[(f64, f64); 2]]) -> Vec<Line<f64>> {
        input.iter().map(|l| Line::from(*l)).collect()
    }

    fn run(input: &[[(f64, f64); 2]]) -> Result<Vec<Intersection>, Error> {
        Sweep::new(lines(input), Tolerance::default())?.run()
    }

    /// Boundary-inclusive containment within tolerance slack.
    fn on_segment(p: Coordinate<f64>, line: &Line<f64>, tol: &Tolerance) -> bool {
        let segment = Segment::new(*line, tol);
        let slack = 10. * tol.eps();
        let within = |v: f64, a: f64, b: f64| v >= a.min(b) - slack && v <= a.max(b) + slack;
        let in_box = within(p.x, segment.left().x(), segment.right().x())
            && within(p.y, segment.left().y(), segment.right().y());
        if segment.is_vertical() {
            in_box && (p.x - segment.left().x()).abs() <= slack
        } else {
            in_box && (p.y - segment.y_at(p.x)).abs() <= slack
        }
    }

    #[test]
    fn crossing_pair() {
        init_log();
        let found = run(&[[(0., 0.), (2., 2.)], [(0., 2.), (2., 0.)]]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, (1., 1.).into());
        assert_eq!(found[0].segments.len(), 2);
    }

    #[test]
    fn horizontal_crosses_vertical() {
        let found = run(&[[(0., 0.), (4., 0.)], [(2., -2.), (2., 2.)]]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, (2., 0.).into());
        assert_eq!(found[0].segments.len(), 2);
    }

    #[test]
    fn three_concurrent_report_one_point() {
        init_log();
        let found = run(&[
            [(0., 0.), (4., 4.)],
            [(0., 4.), (4., 0.)],
            [(0., 2.), (4., 2.)],
        ])
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, (2., 2.).into());
        assert_eq!(found[0].segments.len(), 3);
    }

    #[test]
    fn three_concurrent_normals() {
        // No axis-parallel member this time; the crossing block reverses
        // in place.
        let found = run(&[
            [(0., 0.), (4., 4.)],
            [(0., 4.), (4., 0.)],
            [(0., 1.), (4., 3.)],
        ])
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, (2., 2.).into());
        assert_eq!(found[0].segments.len(), 3);
    }

    #[test]
    fn collinear_disjoint_is_empty() {
        let found = run(&[[(0., 0.), (1., 0.)], [(2., 0.), (3., 0.)]]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn collinear_overlap_is_an_error() {
        let result = run(&[[(0., 0.), (2., 0.)], [(1., 0.), (3., 0.)]]);
        assert!(matches!(result, Err(Error::OverlappingSegments(..))));
        // Diagonal overlaps are caught from the active list as well.
        let result = run(&[[(0., 0.), (2., 2.)], [(1., 1.), (3., 3.)]]);
        assert!(matches!(result, Err(Error::OverlappingSegments(..))));
        // Sharing the left endpoint is not a duplicate, still an overlap.
        let result = run(&[[(0., 0.), (2., 2.)], [(0., 0.), (3., 3.)]]);
        assert!(matches!(result, Err(Error::OverlappingSegments(..))));
    }

    #[test]
    fn duplicates_are_rejected() {
        let result = run(&[[(0., 0.), (2., 2.)], [(0., 0.), (2., 2.)]]);
        assert!(matches!(result, Err(Error::DuplicateSegments(_))));
        // Within tolerance counts as the same segment.
        let result = run(&[[(0., 0.), (2., 2.)], [(0., 0.), (2.000_001, 2.)]]);
        assert!(matches!(result, Err(Error::DuplicateSegments(_))));
    }

    #[test]
    fn degenerate_input_is_rejected() {
        let result = run(&[[(1., 1.), (1., 1.)]]);
        assert!(matches!(result, Err(Error::DegenerateSegment(_))));
        let result = Sweep::new(
            vec![Line::from([(0., 0.), (f64::NAN, 1.)])],
            Tolerance::default(),
        );
        assert!(matches!(result, Err(Error::NonFiniteCoordinate(_))));
    }

    #[test]
    fn shared_endpoint_is_reported_once() {
        let found = run(&[[(0., 0.), (2., 2.)], [(2., 2.), (4., 0.)]]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].point, (2., 2.).into());
        assert_eq!(found[0].segments.len(), 2);
    }

    #[test]
    fn parallels_yield_nothing() {
        let found = run(&[
            [(0., 0.), (4., 2.)],
            [(0., 1.), (4., 3.)],
            [(0., 2.), (4., 4.)],
        ])
        .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn axis_parallel_grid() {
        init_log();
        let found = run(&[
            [(0., 1.), (4., 1.)],
            [(0., 2.), (4., 2.)],
            [(0., 3.), (4., 3.)],
            [(1., 0.), (1., 4.)],
            [(2., 0.), (2., 4.)],
            [(3., 0.), (3., 4.)],
        ])
        .unwrap();
        assert_eq!(found.len(), 9);
        // Sweep order: ascending x, then y.
        assert_eq!(found[0].point, (1., 1.).into());
        assert_eq!(found[8].point, (3., 3.).into());
        for hit in &found {
            assert_eq!(hit.segments.len(), 2);
        }
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(run(&[]).unwrap().is_empty());
        assert!(run(&[[(0., 0.), (5., 3.)]]).unwrap().is_empty());
    }

    #[test]
    fn random_matches_brute_force() {
        init_log();
        let tol = Tolerance::default();
        let bbox = Rect::new([0., 0.], [1000., 1000.]);
        let mut rng = StdRng::seed_from_u64(42);
        let segments: Vec<Line<f64>> = (0..50).map(|_| uniform_line(&mut rng, bbox)).collect();

        let found = Sweep::new(segments.iter().copied(), tol).unwrap().run().unwrap();

        // Brute-force reference over the same tolerance model.
        let mut expected: Vec<(i64, i64)> = Vec::new();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                let a = Segment::new(segments[i], &tol);
                let b = Segment::new(segments[j], &tol);
                if let Some(SegmentCrossing::Point(p)) = segment_crossing(&a, &b, &tol) {
                    expected.push((tol.quantize(p.x), tol.quantize(p.y)));
                }
            }
        }
        expected.sort_unstable();
        expected.dedup();

        let mut reported: Vec<(i64, i64)> = found
            .iter()
            .map(|hit| (tol.quantize(hit.point.x), tol.quantize(hit.point.y)))
            .collect();
        reported.sort_unstable();

        assert_eq!(reported, expected);

        // Soundness: every reported point lies on every segment
        // attributed to it.
        for hit in &found {
            assert!(hit.segments.len() >= 2);
            for line in &hit.segments {
                assert!(
                    on_segment(hit.point, line, &tol),
                    "{:?} not on {:?}",
                    hit.point,
                    line
                );
            }
        }
    }
}
