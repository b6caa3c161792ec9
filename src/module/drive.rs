//! Provide Loop for Capture.
//!

use chrono::{DateTime, Local};
use std::path::Path;
use std::{thread, time};

use crate::module::define;
use crate::module::device::{Camera, Controls};
use crate::module::error::Result;
use crate::module::pilot::{self, ExposureController, FocusMode, TimelapseState};
use crate::module::record::{CaptureRecord, PhotoLog};
use crate::module::util::init::TimelapseProperty;
use crate::module::util::path::TimelapsePath;
use crate::module::vision::brightness;

/// Run the capture loop.
///
/// Returns after `timelapse.max_cycles` shots, or never if that is 0.
/// The first error ends the loop.
pub fn run(property: &TimelapseProperty, camera: &mut dyn Camera) -> Result<()> {
    let conf = &property.conf;
    let controller = pilot::build_controller(conf)?;
    let photo_log = PhotoLog::open(Path::new(&property.path.file.photo_log))?;
    let mut state = TimelapseState::new(conf);
    log::info!(
        "Capturing every {}s with the {} controller",
        conf.timelapse.interval_secs,
        conf.exposure.controller
    );

    let mut cycles: u64 = 0;
    loop {
        cycle(
            property,
            camera,
            controller.as_ref(),
            &photo_log,
            &mut state,
            Local::now(),
        )?;
        cycles += 1;
        if conf.timelapse.max_cycles != 0 && cycles >= conf.timelapse.max_cycles {
            log::info!("Done after {} shots", cycles);
            return Ok(());
        }
        // Wait before next shot
        thread::sleep(time::Duration::from_secs(conf.timelapse.interval_secs));
    }
}

/// Take one shot: pick the mode, capture, measure, log and adjust exposure.
///
pub fn cycle(
    property: &TimelapseProperty,
    camera: &mut dyn Camera,
    controller: &dyn ExposureController,
    photo_log: &PhotoLog,
    state: &mut TimelapseState,
    now: DateTime<Local>,
) -> Result<CaptureRecord> {
    let conf = &property.conf;
    let settle = time::Duration::from_secs_f64(conf.timelapse.settle_secs);

    match FocusMode::select(state.last_brightness, conf) {
        FocusMode::Auto => {
            log::info!("Daylight: Autoexposure and autofocus");
            camera.apply(&Controls::auto())?;
            thread::sleep(settle);
            camera.start()?;
            thread::sleep(settle);
        }
        FocusMode::Fixed => {
            log::info!("Night: Fixed focus");
            camera.apply(&Controls::fixed(
                conf.focus.lens_position,
                state.exposure_time,
                state.gain,
            ))?;
            camera.start()?;
            // Wait for exposure + buffer
            thread::sleep(time::Duration::from_secs_f64(
                state.exposure_time as f64 / 1_000_000.0 + conf.timelapse.exposure_buffer_secs,
            ));
        }
    }

    let timestamp = now.format(define::record::TIMESTAMP_FORMAT).to_string();
    let filename = TimelapsePath::image_name(&timestamp);
    let image_path = property.path.image_path(&timestamp);
    let metadata = camera.capture_file(&image_path)?;
    camera.stop()?;

    // Use the values the camera actually applied
    state.exposure_time = metadata.exposure_time.unwrap_or(state.exposure_time);
    state.gain = metadata.analogue_gain.unwrap_or(state.gain);

    let measured = brightness::measure(&image_path)?;
    state.last_brightness = measured;

    let record = CaptureRecord {
        timestamp: timestamp.clone(),
        filename,
        brightness: measured,
        exposure_time: state.exposure_time,
        gain: state.gain,
        focus_mode: FocusMode::select(measured, conf).label(),
        lens_position: metadata.lens_position,
    };
    photo_log.append(&record)?;
    log::info!("{}: Brightness = {:.1}", timestamp, measured);

    controller.adjust(state, measured);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::device::mock::MockCamera;
    use crate::module::device::{AfMode, CaptureMetadata};
    use crate::module::util::conf::Config;
    use chrono::TimeZone;
    use std::fs;

    fn property(dir: &Path, controller: &str, max_cycles: u64) -> TimelapseProperty {
        let mut conf = Config::default();
        conf.system.output_dir = dir.to_string_lossy().into_owned();
        conf.exposure.controller = controller.to_string();
        conf.timelapse.interval_secs = 0;
        conf.timelapse.settle_secs = 0.0;
        conf.timelapse.exposure_buffer_secs = 0.0;
        conf.timelapse.max_cycles = max_cycles;
        // keep the fixed-mode wait short
        conf.exposure.initial_exposure_time = 10_000;
        conf.proportional.k = 5_000.0;
        let path =
            crate::module::util::path::dir::create_app_sub_dir(&conf.system.output_dir).unwrap();
        TimelapseProperty { path, conf }
    }

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 4, 21, h, m, 0).unwrap()
    }

    #[test]
    fn daylight_cycle_uses_auto_controls() {
        let tmp = tempfile::tempdir().unwrap();
        let property = property(tmp.path(), "proportional", 1);
        let controller = pilot::build_controller(&property.conf).unwrap();
        let log = PhotoLog::open(Path::new(&property.path.file.photo_log)).unwrap();
        let mut state = TimelapseState::new(&property.conf);
        let mut camera = MockCamera::new(&[200]).with_metadata(CaptureMetadata {
            exposure_time: Some(20_000),
            analogue_gain: Some(1.5),
            lens_position: Some(2.345),
        });

        let record = cycle(
            &property,
            &mut camera,
            controller.as_ref(),
            &log,
            &mut state,
            at(12, 0),
        )
        .unwrap();

        assert_eq!(camera.applied, vec![Controls::auto()]);
        assert_eq!(record.timestamp, "2025-04-21_12-00-00");
        assert_eq!(record.filename, "2025-04-21_12-00-00.jpg");
        assert!(tmp.path().join("2025-04-21_12-00-00.jpg").is_file());
        assert!((record.brightness - 200.0).abs() < 2.0);
        assert_eq!(record.exposure_time, 20_000);
        assert_eq!(record.gain, 1.5);
        assert_eq!(record.focus_mode, "auto");
        assert_eq!(record.lens_position, Some(2.345));
        // too bright: exposure pulled down from the reported value
        assert!(state.exposure_time < 20_000);
        assert!(state.exposure_time >= 10_000);
        assert_eq!(state.gain, 1.5);
        assert!((state.last_brightness - 200.0).abs() < 2.0);
    }

    #[test]
    fn night_cycle_uses_fixed_controls() {
        let tmp = tempfile::tempdir().unwrap();
        let property = property(tmp.path(), "multiplicative", 1);
        let controller = pilot::build_controller(&property.conf).unwrap();
        let log = PhotoLog::open(Path::new(&property.path.file.photo_log)).unwrap();
        let mut state = TimelapseState::new(&property.conf);
        state.last_brightness = 20.0;
        let mut camera = MockCamera::new(&[10]);

        let record = cycle(
            &property,
            &mut camera,
            controller.as_ref(),
            &log,
            &mut state,
            at(23, 5),
        )
        .unwrap();

        let applied = &camera.applied[0];
        assert_eq!(applied.af_mode, AfMode::Manual);
        assert!(!applied.ae_enable);
        assert_eq!(applied.lens_position, Some(0.47));
        assert_eq!(applied.exposure_time, Some(10_000));
        assert_eq!(applied.analogue_gain, Some(1.0));
        // no metadata: commanded values are logged
        assert_eq!(record.exposure_time, 10_000);
        assert_eq!(record.gain, 1.0);
        assert_eq!(record.focus_mode, "fixed");
        assert_eq!(record.lens_position, None);
        // too dark: one step up
        assert_eq!(state.exposure_time, 15_000);
        assert!((state.gain - 1.2).abs() < 1e-9);

        let contents = fs::read_to_string(&property.path.file.photo_log).unwrap();
        assert!(contents
            .lines()
            .nth(1)
            .unwrap()
            .starts_with("2025-04-21_23-05-00,2025-04-21_23-05-00.jpg,"));
        assert!(contents.trim_end().ends_with(",fixed,NA"));
    }

    #[test]
    fn mode_follows_previous_brightness() {
        let tmp = tempfile::tempdir().unwrap();
        let property = property(tmp.path(), "proportional", 3);
        let controller = pilot::build_controller(&property.conf).unwrap();
        let log = PhotoLog::open(Path::new(&property.path.file.photo_log)).unwrap();
        let mut state = TimelapseState::new(&property.conf);
        // day, then dusk, then night
        let mut camera = MockCamera::new(&[150, 30, 30]);

        for minute in 0..3 {
            cycle(
                &property,
                &mut camera,
                controller.as_ref(),
                &log,
                &mut state,
                at(19, minute),
            )
            .unwrap();
        }

        let modes: Vec<AfMode> = camera.applied.iter().map(|c| c.af_mode).collect();
        assert_eq!(modes, vec![AfMode::Auto, AfMode::Auto, AfMode::Manual]);
    }

    #[test]
    fn run_stops_after_max_cycles() {
        let tmp = tempfile::tempdir().unwrap();
        let property = property(tmp.path(), "proportional", 2);
        let mut camera = MockCamera::new(&[100]);

        run(&property, &mut camera).unwrap();

        assert_eq!(camera.captured.len(), 2);
        let contents = fs::read_to_string(&property.path.file.photo_log).unwrap();
        // header + one row per shot
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn run_rejects_unknown_controller() {
        let tmp = tempfile::tempdir().unwrap();
        let property = property(tmp.path(), "fuzzy", 1);
        let mut camera = MockCamera::new(&[100]);
        assert!(run(&property, &mut camera).is_err());
        assert!(camera.captured.is_empty());
    }
}
