//! Watch face renderer.
//!
//! Draws a [`Session`] onto a 144×168 Rgb565 target. The UTC clock sits on
//! top with the flight phase and indicators below it. The selected info item
//! is drawn large above the ET chronometer. A visible reminder is drawn as a
//! box over the lower half.

use embassy_time::Instant;
use embedded_graphics::{
    Drawable as EgDrawable,
    geometry::{Point, Size},
    mono_font::{
        MonoTextStyle,
        ascii::{FONT_6X10, FONT_10X20},
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use embedded_text::{
    TextBox,
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::TextBoxStyleBuilder,
};

use flightwatch::{Haptics, Session};

pub const FACE_WIDTH_PX: u32 = 144;
pub const FACE_HEIGHT_PX: u32 = 168;

const CENTER_X: i32 = (FACE_WIDTH_PX / 2) as i32;
const MARGIN_PX: i32 = 4;

const CLOCK_Y: i32 = 6;
const PHASE_Y: i32 = 34;
const INDICATOR_Y: i32 = 50;
const INFO_Y: i32 = 78;
const ET_Y: i32 = 128;

const DIM_GRAY: Rgb565 = Rgb565::new(12, 24, 12);
const AMBER: Rgb565 = Rgb565::new(31, 40, 0);

fn draw_text<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    text: &str,
    position: Point,
    style: MonoTextStyle<'_, Rgb565>,
    alignment: Alignment,
) -> Result<(), D::Error> {
    EgDrawable::draw(
        &Text::with_text_style(
            text,
            position,
            style,
            TextStyleBuilder::new()
                .alignment(alignment)
                .baseline(Baseline::Top)
                .build(),
        ),
        display,
    )?;
    Ok(())
}

/// Render the whole face for `now`.
pub fn draw_face<H, D>(session: &Session<H>, now: Instant, display: &mut D) -> Result<(), D::Error>
where
    H: Haptics,
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(Rgb565::BLACK)?;

    let large = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    let small = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
    let dim = MonoTextStyle::new(&FONT_6X10, DIM_GRAY);

    // Clock band
    draw_text(
        display,
        session.clock_text(now).as_str(),
        Point::new(MARGIN_PX, CLOCK_Y),
        large,
        Alignment::Left,
    )?;
    draw_text(
        display,
        "UTC",
        Point::new(MARGIN_PX + 44, CLOCK_Y + 8),
        dim,
        Alignment::Left,
    )?;
    draw_text(
        display,
        session.day_text(now).as_str(),
        Point::new(FACE_WIDTH_PX as i32 - MARGIN_PX, CLOCK_Y),
        large,
        Alignment::Right,
    )?;

    // Phase and indicators
    draw_text(
        display,
        session.phase().title(),
        Point::new(CENTER_X, PHASE_Y),
        small,
        Alignment::Center,
    )?;
    if session.blink_state() {
        draw_text(
            display,
            "TAXI",
            Point::new(MARGIN_PX, INDICATOR_Y),
            MonoTextStyle::new(&FONT_6X10, AMBER),
            Alignment::Left,
        )?;
    }
    if session.live_indicator_visible() {
        draw_text(
            display,
            "LIVE",
            Point::new(FACE_WIDTH_PX as i32 - MARGIN_PX, INDICATOR_Y),
            MonoTextStyle::new(&FONT_6X10, Rgb565::GREEN),
            Alignment::Right,
        )?;
    }

    // Main info item
    let (label, text) = session.display_text();
    draw_text(
        display,
        label.as_str(),
        Point::new(MARGIN_PX, INFO_Y + 4),
        small,
        Alignment::Left,
    )?;
    draw_text(
        display,
        text.as_str(),
        Point::new(CENTER_X + 8, INFO_Y),
        large,
        Alignment::Center,
    )?;

    // ET chronometer
    draw_text(
        display,
        "ET",
        Point::new(MARGIN_PX, ET_Y + 4),
        dim,
        Alignment::Left,
    )?;
    draw_text(
        display,
        session.elapsed_text(now).as_str(),
        Point::new(CENTER_X, ET_Y),
        large,
        Alignment::Center,
    )?;
    if let Some(minute) = session.elapsed_start_minute(now) {
        draw_text(
            display,
            minute.as_str(),
            Point::new(FACE_WIDTH_PX as i32 - MARGIN_PX, ET_Y + 4),
            dim,
            Alignment::Right,
        )?;
    }

    if let Some(reminder) = session.alarm_presentation() {
        draw_reminder(display, reminder.message, reminder.important)?;
    }

    Ok(())
}

fn draw_reminder<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    message: &str,
    important: bool,
) -> Result<(), D::Error> {
    let bounds = Rectangle::new(
        Point::new(MARGIN_PX, INFO_Y - 8),
        Size::new(FACE_WIDTH_PX - 2 * MARGIN_PX as u32, 80),
    );
    let border = if important { Rgb565::RED } else { AMBER };

    bounds
        .into_styled(
            PrimitiveStyleBuilder::new()
                .fill_color(Rgb565::BLACK)
                .stroke_color(border)
                .stroke_width(2)
                .build(),
        )
        .draw(display)?;

    let inner = bounds.offset(-6);
    EgDrawable::draw(
        &TextBox::with_textbox_style(
            message,
            inner,
            MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE),
            TextBoxStyleBuilder::new()
                .alignment(HorizontalAlignment::Center)
                .vertical_alignment(VerticalAlignment::Middle)
                .build(),
        ),
        display,
    )?;

    if important {
        Rectangle::new(bounds.top_left + Point::new(6, 6), Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_fill(border))
            .draw(display)?;
    }
    Ok(())
}
