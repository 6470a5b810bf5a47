/// Anything that lays itself out as styled lines for a given column count.
pub trait Component {
    /// Lines must not exceed `width` visible columns.
    fn render(&mut self, width: usize) -> Vec<String>;

    /// Drops width-keyed caches so the next render recomputes.
    fn invalidate(&mut self) {}
}
