/// Piecewise-constant profile of the lowest occupied bottom edge over x.
///
/// Segments are half-open `[start, end)`, sorted and disjoint, so a query is
/// the maximum over every footprint strictly overlapping the queried span.
/// Spans that merely touch do not overlap. Zero-width footprints are kept as
/// points and only count when they fall strictly inside a queried span.
#[derive(Debug, Clone, Default)]
pub(super) struct Skyline {
    segments: Vec<Segment>,
    points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: f32,
    end: f32,
    bottom: f32,
}

impl Segment {
    fn new(start: f32, end: f32, bottom: f32) -> Self {
        Self { start, end, bottom }
    }
}

impl Skyline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest bottom among footprints overlapping `[start, end)`. An empty
    /// span `start == end` asks for the footprints strictly covering `start`.
    pub fn max_in(&self, start: f32, end: f32) -> Option<f32> {
        if start == end {
            return self.max_at(start);
        }
        if !(start < end) {
            return None;
        }
        let covered = self
            .segments
            .iter()
            .skip_while(|seg| seg.end <= start)
            .take_while(|seg| seg.start < end)
            .map(|seg| seg.bottom);
        let points = self
            .points
            .iter()
            .filter(|&&(x, _)| start < x && x < end)
            .map(|&(_, bottom)| bottom);
        covered.chain(points).reduce(f32::max)
    }

    fn max_at(&self, x: f32) -> Option<f32> {
        let idx = self.segments.partition_point(|seg| seg.end <= x);
        let seg = self.segments.get(idx)?;
        if seg.start < x {
            return Some(seg.bottom);
        }
        // Exactly on a seam: whatever covered x spans both neighbours.
        match idx.checked_sub(1).map(|prev| self.segments[prev]) {
            Some(prev) if seg.start == x && prev.end == x => Some(prev.bottom.min(seg.bottom)),
            _ => None,
        }
    }

    /// Raises the profile over `[start, end)` to at least `bottom`.
    pub fn insert(&mut self, start: f32, end: f32, bottom: f32) {
        if start == end {
            self.points.push((start, bottom));
            return;
        }
        if !(start < end) {
            return;
        }
        let mut out = Vec::with_capacity(self.segments.len() + 3);
        let mut cursor = start;
        let mut filled = false;
        for seg in std::mem::take(&mut self.segments) {
            if seg.end <= start {
                out.push(seg);
                continue;
            }
            if seg.start >= end {
                if !filled && cursor < end {
                    out.push(Segment::new(cursor, end, bottom));
                }
                filled = true;
                out.push(seg);
                continue;
            }
            if seg.start < start {
                out.push(Segment::new(seg.start, start, seg.bottom));
            }
            let lo = seg.start.max(start);
            if cursor < lo {
                out.push(Segment::new(cursor, lo, bottom));
            }
            let hi = seg.end.min(end);
            out.push(Segment::new(lo, hi, seg.bottom.max(bottom)));
            cursor = hi;
            if seg.end > end {
                out.push(Segment::new(end, seg.end, seg.bottom));
            }
        }
        if !filled && cursor < end {
            out.push(Segment::new(cursor, end, bottom));
        }
        self.segments = out;
    }
}
