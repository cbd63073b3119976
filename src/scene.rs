use crate::error::RenderError;
use crate::field::{AnalyticField, FieldObject};
use crate::ray::RaySet;
use crate::render::{Camera, RenderOptions, RenderPipeline, GAMMA};
use crate::utils;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// A self-contained render job: options, camera, and the analytic field
/// objects standing in for a trained model.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scene {
    pub options: RenderOptions,
    camera: Camera,
    objects: Vec<FieldObject>,
}

impl Scene {
    pub fn new(options: RenderOptions, camera: Camera) -> Self {
        Self {
            options,
            camera,
            ..Scene::default()
        }
    }

    pub fn add_object(&mut self, object: FieldObject) {
        self.objects.push(object);
    }

    /// Renders the scene to an RGBA image using the fine pass of the
    /// pipeline, one row of pixels per pipeline call so progress is visible.
    pub fn render_to_image(&self, use_progress: bool) -> Result<(RgbaImage, Duration), RenderError> {
        let width = self.options.width;
        let height = self.options.height;
        if width == 0 || height == 0 {
            return Ok((RgbaImage::new(0, 0), Duration::ZERO));
        }

        let field = AnalyticField::new(self.objects.clone());
        let pipeline = RenderPipeline::new(self.options.sampling);
        let mut rng = StdRng::seed_from_u64(self.options.seed);

        let rays = self.camera.primary_rays(width, height)?;
        let progress = if use_progress {
            let progress = ProgressBar::new(height.into());
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise} elapsed] {bar:40} {pos}/{len} rows"),
            );
            Some(progress)
        } else {
            None
        };

        let mut image_buffer: Vec<u8> = Vec::with_capacity(width as usize * height as usize * 4);
        let start = Instant::now();
        for row in rays.rays().chunks(width as usize) {
            let row_rays = RaySet::new(row.to_vec())?;
            let result = pipeline.render_with_rng(&field, &row_rays, &mut rng)?;

            for color in result.fine_color {
                let corrected = utils::gamma_correct(clamp_color(color), GAMMA);
                image_buffer.push((corrected.x * 255.0) as u8);
                image_buffer.push((corrected.y * 255.0) as u8);
                image_buffer.push((corrected.z * 255.0) as u8);
                image_buffer.push(255);
            }

            if let Some(progress) = &progress {
                progress.inc(1);
            }
        }
        let duration = start.elapsed();

        if let Some(progress) = &progress {
            progress.finish();
        }

        let image = RgbaImage::from_raw(width, height, image_buffer)
            .expect("failed to convert buffer");

        Ok((image, duration))
    }
}

fn clamp_color(color: Vector3<f64>) -> Vector3<f64> {
    color.map(|c| c.clamp(0.0, 1.0))
}
