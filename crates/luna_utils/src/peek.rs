/// An iterator that can look at its next item without consuming it.
pub trait Peek: Iterator {
    fn peek(&self) -> Option<Self::Item>;
}

impl Peek for std::str::Chars<'_> {
    fn peek(&self) -> Option<Self::Item> {
        self.clone().next()
    }
}
