//! Compact one-line rendering of paths for logs and tests.
//!
//! Legs and stops alternate, separated by `~`:
//!
//! ```text
//! Walk 3m ~ 1 ~ BUS L11 10:04 10:35 ~ 2 ~ Walk 7m45s [10:00:15 10:43 42m45s Tx0 $2458]
//! ```

use crate::domain::{StopIndex, format_duration, format_time};
use crate::transit::{StreetLeg, format_cost};

const SEPARATOR: &str = " ~ ";

/// Incremental builder for the `~`-separated path format.
///
/// `street`, `transit` and `stop` start a new element. The remaining
/// methods append to the current element.
#[derive(Debug, Default, Clone)]
pub struct PathStringBuilder {
    buf: String,
}

impl PathStringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn element(&mut self, text: &str) -> &mut Self {
        if !self.buf.is_empty() {
            self.buf.push_str(SEPARATOR);
        }
        self.buf.push_str(text);
        self
    }

    fn append(&mut self, text: &str) -> &mut Self {
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(text);
        self
    }

    /// A street leg: mode label, duration and any embedded rides.
    pub fn street(&mut self, leg: &dyn StreetLeg) -> &mut Self {
        let mut text = format!(
            "{} {}",
            leg.mode_label(),
            format_duration(leg.fixed_duration_seconds())
        );
        if leg.has_embedded_rides() {
            text.push_str(&format!(" {}x", leg.number_of_rides()));
        }
        self.element(&text)
    }

    /// A ride: route description and scheduled times.
    pub fn transit(&mut self, description: &str, board_time: i32, alight_time: i32) -> &mut Self {
        let text = format!(
            "{description} {} {}",
            format_time(board_time),
            format_time(alight_time)
        );
        self.element(&text)
    }

    pub fn stop(&mut self, stop: StopIndex) -> &mut Self {
        self.element(&stop.to_string())
    }

    pub fn times(&mut self, from_time: i32, to_time: i32) -> &mut Self {
        self.append(&format_time(from_time));
        self.append(&format_time(to_time))
    }

    pub fn duration(&mut self, seconds: i32) -> &mut Self {
        self.append(&format_duration(seconds))
    }

    pub fn cost(&mut self, cost: i32) -> &mut Self {
        self.append(&format_cost(cost))
    }

    /// Path totals in brackets: start, end, duration, transfers and cost.
    pub fn summary(
        &mut self,
        start_time: i32,
        end_time: i32,
        number_of_transfers: usize,
        cost: i32,
    ) -> &mut Self {
        let text = format!(
            "[{} {} {} Tx{} {}]",
            format_time(start_time),
            format_time(end_time),
            format_duration(end_time - start_time),
            number_of_transfers,
            format_cost(cost)
        );
        self.append(&text)
    }

    pub fn build(&self) -> String {
        self.buf.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_time;
    use crate::transit::mock::TestStreetLeg;

    fn t(s: &str) -> i32 {
        parse_time(s).unwrap()
    }

    #[test]
    fn elements_are_separated() {
        let walk = TestStreetLeg::walk_to(StopIndex(1), 180);
        let mut builder = PathStringBuilder::new();
        builder
            .street(&walk)
            .stop(StopIndex(1))
            .transit("BUS L11", t("10:04"), t("10:35"))
            .stop(StopIndex(2));

        assert_eq!(builder.build(), "Walk 3m ~ 1 ~ BUS L11 10:04 10:35 ~ 2");
    }

    #[test]
    fn flex_shows_rides() {
        let flex = TestStreetLeg::flex_from(StopIndex(5), 900, 1);
        let mut builder = PathStringBuilder::new();
        builder.street(&flex);

        assert_eq!(builder.build(), "Flex 15m 1x");
    }

    #[test]
    fn details_and_summary_extend_the_current_element() {
        let walk = TestStreetLeg::walk_from(StopIndex(5), 465);
        let mut builder = PathStringBuilder::new();
        builder
            .street(&walk)
            .times(t("11:52:15"), t("12:00"))
            .cost(93_000)
            .summary(t("10:00:15"), t("12:00"), 2, 815_400);

        assert_eq!(
            builder.build(),
            "Walk 7m45s 11:52:15 12:00 $930 [10:00:15 12:00 1h59m45s Tx2 $8154]"
        );
    }

    #[test]
    fn empty() {
        assert_eq!(PathStringBuilder::new().build(), "");
    }
}
