use cmouse::Dims;
use crossterm::style::ContentStyle;
use unicode_width::UnicodeWidthStr as _;

use super::GBuffer;

pub trait Drawable<S = ()> {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, styles: S);
}

impl Drawable<ContentStyle> for char {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, styles: ContentStyle) {
        frame.put_char(pos, *self, styles);
    }
}

impl Drawable<ContentStyle> for &'_ str {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, styles: ContentStyle) {
        for (x, character) in self.chars().enumerate() {
            frame.put_char(Dims(pos.0 + x as i32, pos.1), character, styles);
        }
    }
}

impl Drawable<ContentStyle> for String {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, styles: ContentStyle) {
        self.as_str().draw(pos, frame, styles);
    }
}

pub trait SizedDrawable<S = ()>: Drawable<S> {
    fn size(&self) -> Dims;
}

impl SizedDrawable<ContentStyle> for &'_ str {
    fn size(&self) -> Dims {
        Dims(self.width() as i32, 1)
    }
}

impl SizedDrawable<ContentStyle> for String {
    fn size(&self) -> Dims {
        Dims(self.width() as i32, 1)
    }
}

pub struct Styled<T, S>(pub T, pub S);

impl<T: Drawable<S>, S: Clone> Drawable for Styled<T, S> {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, _: ()) {
        self.0.draw(pos, frame, self.1.clone());
    }
}

impl<T: SizedDrawable<S>, S: Clone> SizedDrawable for Styled<T, S> {
    fn size(&self) -> Dims {
        self.0.size()
    }
}
