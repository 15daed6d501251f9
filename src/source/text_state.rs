//! Text state machine for content stream interpretation.
//!
//! Tracks the transformation matrices and text parameters that decide where a
//! shown glyph lands on the page.

use crate::geometry::Rect;

/// Fraction of the font size above the baseline used for glyph boxes.
const ASCENT: f32 = 0.8;
/// Fraction of the font size below the baseline used for glyph boxes.
const DESCENT: f32 = 0.2;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Multiply this matrix with another matrix.
    ///
    /// The result represents first applying `self`, then applying `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::source::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 0.0).multiply(&Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
    /// assert_eq!(m.transform_point(0.0, 0.0), (20.0, 0.0));
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point using this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Graphics and text state relevant to glyph placement.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Current transformation matrix
    pub ctm: Matrix,
    /// Text matrix (Tm)
    pub text_matrix: Matrix,
    /// Text line matrix
    pub text_line_matrix: Matrix,
    /// Character spacing (Tc)
    pub char_space: f32,
    /// Word spacing (Tw)
    pub word_space: f32,
    /// Horizontal scaling percentage (Tz)
    pub horizontal_scaling: f32,
    /// Text leading (TL)
    pub leading: f32,
    /// Font resource name (Tf)
    pub font: Option<Vec<u8>>,
    /// Font size (Tf)
    pub font_size: f32,
    /// Text rise (Ts)
    pub text_rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font: None,
            font_size: 12.0,
            text_rise: 0.0,
        }
    }
}

impl TextState {
    /// `BT`: reset the text and line matrices.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.text_line_matrix = Matrix::identity();
    }

    /// `cm`: concatenate a matrix onto the CTM.
    pub fn concat(&mut self, m: Matrix) {
        self.ctm = m.multiply(&self.ctm);
    }

    /// `Td`: move to the start of the next line, offset from the current one.
    pub fn move_line(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// `TD`: like `Td`, also setting the leading to `-ty`.
    pub fn move_line_set_leading(&mut self, tx: f32, ty: f32) {
        self.leading = -ty;
        self.move_line(tx, ty);
    }

    /// `Tm`: replace the text and line matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.text_line_matrix = m;
    }

    /// `T*`: move to the next line using the leading.
    pub fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Text rendering matrix for the current glyph position.
    pub fn rendering_matrix(&self) -> Matrix {
        let th = self.horizontal_scaling / 100.0;
        let params = Matrix::new(self.font_size * th, 0.0, 0.0, self.font_size, 0.0, self.text_rise);
        params.multiply(&self.text_matrix).multiply(&self.ctm)
    }

    /// Bounding box of a glyph about to be shown, in top-down coordinates.
    ///
    /// `width` is the glyph advance in glyph space (thousandths of the font
    /// size); `page_top` is the user-space y of the page's upper edge.
    pub fn glyph_box(&self, width: f32, page_top: f32) -> Rect {
        let trm = self.rendering_matrix();
        let (x0, baseline) = trm.transform_point(0.0, 0.0);
        let (x1, _) = trm.transform_point(width / 1000.0, 0.0);
        let size = (trm.c * trm.c + trm.d * trm.d).sqrt();
        Rect::new(
            x0.min(x1),
            page_top - (baseline + ASCENT * size),
            x0.max(x1),
            page_top - (baseline - DESCENT * size),
        )
    }

    /// Effective font size in user space.
    pub fn effective_font_size(&self) -> f32 {
        let trm = self.rendering_matrix();
        (trm.c * trm.c + trm.d * trm.d).sqrt()
    }

    /// Advance the text matrix past a shown glyph.
    ///
    /// Word spacing applies to the single-byte code 32 only.
    pub fn advance(&mut self, width: f32, is_word_space: bool) {
        let th = self.horizontal_scaling / 100.0;
        let mut tx = width / 1000.0 * self.font_size + self.char_space;
        if is_word_space {
            tx += self.word_space;
        }
        self.text_matrix = Matrix::translation(tx * th, 0.0).multiply(&self.text_matrix);
    }

    /// Apply a `TJ` array adjustment (thousandths of text space, subtracted).
    pub fn adjust(&mut self, amount: f32) {
        let th = self.horizontal_scaling / 100.0;
        let tx = -amount / 1000.0 * self.font_size * th;
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }
}
