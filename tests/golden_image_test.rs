#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod offscreen {
    use crate::common::test_utils::{ScriptedRandom, gpu, scripted_puzzle};
    use instant::{Duration, Instant};
    use puzzle_cube::{
        FrameLoop, PuzzleConfig,
        config::{BloomConfig, MaterialConfig},
        render::{Compositor, OffscreenFrame},
    };

    fn matte_config() -> PuzzleConfig {
        PuzzleConfig {
            composite_size: [256, 256],
            material: MaterialConfig {
                colour: 0xffffff,
                metalness: 0.0,
                roughness: 0.5,
            },
            ..PuzzleConfig::default()
        }
    }

    fn luma(pixel: &image::Rgba<u8>) -> u32 {
        let [r, g, b, _] = pixel.0;
        (r as u32 + g as u32 + b as u32) / 3
    }

    async fn render_one_frame(
        config: PuzzleConfig,
        bloom: Option<BloomConfig>,
    ) -> anyhow::Result<image::RgbaImage> {
        let (device, queue) = gpu::headless_device().await?;
        let script = ScriptedRandom::new(&[0.0]);
        let mut puzzle = scripted_puzzle(&config, &script);
        let mut compositor = Compositor::new(&device, &config, &puzzle.scene);
        assert_eq!(compositor.size(), config.composite_size);
        if let Some(bloom) = bloom {
            compositor.set_bloom(&queue, &bloom);
        }

        let mut frame = OffscreenFrame {
            device: &device,
            queue: &queue,
            compositor: &mut compositor,
        };
        FrameLoop::new().tick(
            &mut puzzle,
            Duration::from_millis(16),
            Instant::now(),
            &mut frame,
        )?;

        assert_eq!(compositor.instance_count(), 27);
        gpu::read_texture(&device, &queue, compositor.output()).await
    }

    #[tokio::test]
    async fn should_render_a_lit_cube_on_a_dark_background() -> anyhow::Result<()> {
        let image = render_one_frame(matte_config(), None).await?;
        assert_eq!(image.dimensions(), (256, 256));

        let (w, h) = image.dimensions();
        for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
            let corner = luma(image.get_pixel(x, y));
            assert!(corner < 24, "corner ({}, {}) is lit: {}", x, y, corner);
        }

        let brightest_centre = (w / 2 - 10..w / 2 + 10)
            .flat_map(|x| (h / 2 - 10..h / 2 + 10).map(move |y| (x, y)))
            .map(|(x, y)| luma(image.get_pixel(x, y)))
            .max()
            .unwrap_or(0);
        assert!(
            brightest_centre > 40,
            "cube centre is too dark: {}",
            brightest_centre
        );
        Ok(())
    }

    #[tokio::test]
    async fn should_leave_the_background_black_without_bloom() -> anyhow::Result<()> {
        let no_bloom = BloomConfig {
            intensity: 0.0,
            ..BloomConfig::default()
        };
        let image = render_one_frame(matte_config(), Some(no_bloom)).await?;

        let corner = image.get_pixel(0, 0);
        assert_eq!(corner.0[..3], [0, 0, 0]);
        Ok(())
    }
}
