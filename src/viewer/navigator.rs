/// Authoritative slide index for one open session, with wraparound.
///
/// An empty navigator is inert: every operation leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideNavigator {
    len: usize,
    current: usize,
}

impl SlideNavigator {
    pub fn new(len: usize, initial: usize) -> Self {
        let mut nav = Self { len, current: 0 };
        nav.set_index(initial);
        nav
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
        self.current
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + self.len - 1) % self.len;
        }
        self.current
    }

    /// Out-of-range values are clamped to the last slide.
    pub fn set_index(&mut self, index: usize) -> usize {
        if self.len > 0 {
            self.current = index.min(self.len - 1);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_back_to_start_for_every_index() {
        for len in 1..6 {
            for start in 0..len {
                let mut nav = SlideNavigator::new(len, start);
                for _ in 0..len {
                    nav.next();
                }
                assert_eq!(nav.current_index(), start, "len={len} start={start}");
            }
        }
    }

    #[test]
    fn prev_wraps_from_first_to_last() {
        let mut nav = SlideNavigator::new(3, 0);
        assert_eq!(nav.prev(), 2);
        assert_eq!(nav.prev(), 1);
        assert_eq!(nav.next(), 2);
        assert_eq!(nav.next(), 0);
    }

    #[test]
    fn set_index_clamps_out_of_range() {
        let mut nav = SlideNavigator::new(4, 9);
        assert_eq!(nav.current_index(), 3);
        assert_eq!(nav.set_index(1), 1);
        assert_eq!(nav.set_index(usize::MAX), 3);
    }

    #[test]
    fn empty_navigator_is_a_no_op() {
        let mut nav = SlideNavigator::new(0, 5);
        assert!(nav.is_empty());
        assert_eq!(nav.next(), 0);
        assert_eq!(nav.prev(), 0);
        assert_eq!(nav.set_index(2), 0);
    }
}
