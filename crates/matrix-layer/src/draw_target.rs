//! `embedded-graphics` integration
//!
//! Both the [`Rasterizer`] and the producer [`Canvas`] are draw targets, so
//! anything in the embedded-graphics ecosystem (styled primitives, mono
//! text, images) can be drawn into the layer's draw buffer in logical
//! coordinates.

use core::convert::Infallible;

use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use embedded_graphics::primitives::Rectangle;

use crate::layer::Canvas;
use crate::pixel::LayerPixel;
use crate::raster::Rasterizer;

impl<P: LayerPixel> OriginDimensions for Rasterizer<'_, P> {
    fn size(&self) -> Size {
        Size::new(
            u32::from(self.mapper().logical_width()),
            u32::from(self.mapper().logical_height()),
        )
    }
}

impl<P: LayerPixel> DrawTarget for Rasterizer<'_, P> {
    type Color = P;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        if let Some(bottom_right) = area.bottom_right() {
            let top_left = area.top_left;
            self.fill_rectangle(top_left.x, top_left.y, bottom_right.x, bottom_right.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color);
        Ok(())
    }
}

impl<P: LayerPixel> OriginDimensions for Canvas<'_, '_, P> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl<P: LayerPixel> DrawTarget for Canvas<'_, '_, P> {
    type Color = P;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.raster().draw_iter(pixels)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.raster().fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.raster().clear(color)
    }
}
