//! Integration tests for dstretch-rs crates.
//!
//! End-to-end checks that span the colorspace catalog, the processors and
//! the decorrelation engine.

use dstretch_core::RgbImage;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mid-range image with three loosely related channels.
pub fn textured(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        [
            (100 + (x * 7 + y * 3) % 50) as u8,
            (110 + (x * 3 + y * 11) % 40) as u8,
            (90 + (x * 13 + y * 5) % 45) as u8,
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dstretch::{
        decorrelate, quick_enhance, DecorrelationStretch, Pipeline, PipelineConfig,
        PreprocessingConfig, Preset, Session,
    };
    use dstretch_color::builtin::CRGB_MATRIX;
    use dstretch_color::{ColorspaceRegistry, DecorrelationRoute};
    use dstretch_core::{quantize, ErrorKind, FloatImage};
    use dstretch_ops::auto_contrast::{auto_contrast, AutoContrastParams};
    use dstretch_ops::color_balance::{color_balance, ColorBalanceParams};
    use dstretch_ops::hue_shift::{hue_shift, HueShiftParams};
    use dstretch_ops::invert::{invert, InvertMode, InvertParams};
    use dstretch_ops::{ProcessorKind, ProcessorParams};
    use tempfile::tempdir;

    fn max_channel_diff(a: &RgbImage, b: &RgbImage) -> u8 {
        a.data()
            .iter()
            .zip(b.data())
            .map(|(p, q)| p.abs_diff(*q))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_every_colorspace_round_trips() {
        init_tracing();
        let img = RgbImage::from_fn(64, 64, |x, y| {
            [(x * 4) as u8, (y * 4) as u8, ((x * 7 + y * 13) % 256) as u8]
        });
        let registry = ColorspaceRegistry::with_builtins();
        for cs in registry.iter() {
            let back = cs.from_space(&cs.to_space(&img));
            let diff = max_channel_diff(&img, &back);
            assert!(diff <= 2, "{}: max diff {}", cs.name(), diff);
        }
    }

    fn space_means(img: &FloatImage) -> [f64; 3] {
        let n = img.pixels().len() as f64;
        let mut sums = [0.0; 3];
        for p in img.pixels() {
            for c in 0..3 {
                sums[c] += p[c];
            }
        }
        sums.map(|s| s / n)
    }

    #[test]
    fn test_stretch_preserves_mean_in_working_space() {
        let img = textured(48, 48);
        let registry = ColorspaceRegistry::with_builtins();
        let mut checked = 0;
        for cs in registry.iter() {
            if !matches!(cs.route(), DecorrelationRoute::Statistical { .. }) {
                continue;
            }
            let r = decorrelate(&img, cs.name(), 2.0, None).unwrap();
            let before = space_means(&cs.to_space(&img));
            let after = space_means(&cs.to_space(&r.image));
            for c in 0..3 {
                assert_abs_diff_eq!(before[c], after[c], epsilon = 1e-3);
            }
            checked += 1;
        }
        assert_eq!(checked, 18);
    }

    #[test]
    fn test_variance_grows_with_scale() {
        let img = textured(40, 40);
        let engine = DecorrelationStretch::new();
        let axis = engine
            .process(&img, "RGB", 1.0, None)
            .unwrap()
            .eigen
            .unwrap()
            .vector(0);

        let projected_variance = |scale: f64| {
            let out = engine.process(&img, "RGB", scale, None).unwrap().image.to_normalized();
            let proj: Vec<f64> = out
                .pixels()
                .iter()
                .map(|p| p[0] * axis.x + p[1] * axis.y + p[2] * axis.z)
                .collect();
            let n = proj.len() as f64;
            let mean = proj.iter().sum::<f64>() / n;
            proj.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
        };

        let variances: Vec<f64> = [1.0, 2.0, 4.0].into_iter().map(projected_variance).collect();
        assert!(variances[0] < variances[1], "{:?}", variances);
        assert!(variances[1] < variances[2], "{:?}", variances);
    }

    #[test]
    fn test_auto_contrast_full_range_is_noop() {
        let img = RgbImage::from_fn(256, 4, |x, _| {
            [x as u8, 255 - x as u8, ((x * 7) % 256) as u8]
        });
        for preserve_colors in [true, false] {
            let params = AutoContrastParams {
                clip_percentage: 0.0,
                preserve_colors,
            };
            let (out, _) = auto_contrast(&img, &params).unwrap();
            assert_eq!(out, img);
        }
    }

    #[test]
    fn test_gray_world_without_cast_is_noop() {
        let base = [50u8, 120, 200];
        let img = RgbImage::from_fn(30, 10, |x, _| {
            let k = (x % 3) as usize;
            [base[k], base[(k + 1) % 3], base[(k + 2) % 3]]
        });
        let (out, stats) = color_balance(&img, &ColorBalanceParams::default()).unwrap();
        assert!(max_channel_diff(&img, &out) <= 1);
        assert_abs_diff_eq!(stats.cast_before, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let img = textured(20, 20);
        for params in [
            InvertParams::default(),
            InvertParams::selective(&[0, 2]),
        ] {
            let (once, _) = invert(&img, &params).unwrap();
            let (twice, _) = invert(&once, &params).unwrap();
            assert_eq!(twice, img, "{:?}", params.mode);
        }
        assert_eq!(InvertParams::default().mode, InvertMode::Full);
    }

    #[test]
    fn test_uniform_gray_survives_stretch() {
        let img = RgbImage::filled(10, 10, [128, 128, 128]);
        let r = decorrelate(&img, "YDS", 15.0, None).unwrap();
        assert_eq!(r.image, img);
    }

    #[test]
    fn test_crgb_two_region_scenario() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 { [200, 50, 50] } else { [50, 50, 200] }
        });
        let r = decorrelate(&img, "CRGB", 10.0, None).unwrap();
        assert!(r.transform_matrix.max_abs_diff(&CRGB_MATRIX) < 1e-15);

        let mean = r.color_mean;
        for y in 0..10 {
            for x in 0..10 {
                let p = img.pixel(x, y).map(|c| c as f64 / 255.0);
                let expected = CRGB_MATRIX.apply_about(p, mean).map(|c| quantize(c * 255.0));
                assert_eq!(r.image.pixel(x, y), expected);
            }
        }
    }

    #[test]
    fn test_half_turn_hue_twice_restores() {
        let img = textured(24, 24);
        let params = HueShiftParams::rotate(180.0);
        let (once, stats) = hue_shift(&img, &params).unwrap();
        assert_abs_diff_eq!(stats.applied_shift, 180.0);
        let (twice, _) = hue_shift(&once, &params).unwrap();
        assert!(max_channel_diff(&img, &twice) <= 1);
    }

    #[test]
    fn test_stretch_independent_of_thread_count() {
        let img = textured(96, 80);
        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| decorrelate(&img, "LDS", 25.0, None).unwrap());
        let multi = decorrelate(&img, "LDS", 25.0, None).unwrap();
        assert_eq!(single.image, multi.image);
        assert_eq!(single.transform_matrix, multi.transform_matrix);
    }

    #[test]
    fn test_full_pipeline_all_processors() {
        init_tracing();
        let img = textured(48, 32);
        let config = PreprocessingConfig::builder()
            .enable(ProcessorKind::Invert)
            .enable(ProcessorKind::Flatten)
            .enable(ProcessorKind::HueShift)
            .enable(ProcessorKind::ColorBalance)
            .enable(ProcessorKind::AutoContrast)
            .build();
        let r = Pipeline::new().process_complete(&img, &config, "LRE", 20.0).unwrap();
        assert_eq!(
            r.preprocessing_names(),
            vec!["flatten", "color_balance", "auto_contrast", "hue_shift", "invert"]
        );
        assert_eq!(r.final_image().dimensions(), (48, 32));
        assert!(r.original.ptr_eq(&img));
    }

    #[test]
    fn test_pipeline_errors_are_all_or_nothing() {
        let img = textured(16, 16);
        let mut session = Session::new();
        let config = PreprocessingConfig::new(vec![ProcessorParams::HueShift(
            HueShiftParams::rotate(720.0),
        )]);
        let err = session
            .run_pipeline(&Pipeline::new(), &img, &config, "YDS", 15.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(session.last_processed().is_none());
    }

    #[test]
    fn test_yaml_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("enhance.yaml");
        std::fs::write(
            &path,
            "colorspace: LXX\n\
             scale: 18\n\
             custom_matrix: [[1.0, 0.0, 0.0], [0.0, 1.4, -0.2], [0.0, -0.2, 1.4]]\n\
             steps:\n  \
               - type: auto_contrast\n    \
                 clip_percentage: 0.5\n  \
               - type: color_balance\n    \
                 method: gray_world\n",
        )
        .unwrap();

        let cfg = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(cfg.colorspace(), "LXX");
        assert_eq!(cfg.scale(), 18.0);
        let r = cfg.run(&textured(32, 32)).unwrap();
        assert_eq!(r.preprocessing_names(), vec!["color_balance", "auto_contrast"]);
        assert_eq!(r.decorrelation.colorspace, "LXX");
    }

    #[test]
    fn test_config_yaml_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preset.yaml");
        let cfg = PipelineConfig::from_preset(Preset::HighContrast);
        std::fs::write(&path, cfg.to_yaml_string().unwrap()).unwrap();
        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.colorspace(), "LRE");
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempdir().unwrap();
        let err = PipelineConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_presets_keep_dimensions() {
        let img = textured(40, 24);
        for preset in Preset::ALL {
            let r = quick_enhance(&img, preset).unwrap();
            assert_eq!(r.final_image().dimensions(), img.dimensions(), "{preset}");
        }
    }
}
