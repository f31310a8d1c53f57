// Builtin device profiles
// A representative set of SteelSeries mice across the command generations

use rivalcfg_transport::ReportType;

use super::types::{CommandSpec, DeviceProfile, SettingDescriptor};
use crate::handlers::{
    ButtonCodes, ButtonSpec, ButtonsParams, ChoiceOption, ChoiceParams, ChoiceTable, CpiMode,
    MultiColorParams, MultiCpiParams, MultiDpiChoiceParams, MultiDpiRangeParams, PresetLayout,
    RangeParams, RangeSpec, ReactiveParams, RgbGradientParams, RgbGradientV2Params,
    Rival700GradientParams, SettingKind,
};

/// SteelSeries USB vendor ID
pub const STEELSERIES_VID: u16 = 0x1038;

/// Protocol 1 report size (Sensei 310 / Rival 310 generation)
const REPORT_SIZE: usize = 64;

const DEFAULT_GRADIENT: &str =
    "rgbgradient(duration=1000; colors=0%: #ff0000, 33%: #00ff00, 66%: #0000ff)";

/// 125/250/500/1000 Hz with the given codes
fn polling_rate(command: &[u8], codes: [u64; 4]) -> SettingDescriptor {
    let choices = [125, 250, 500, 1000]
        .iter()
        .zip(codes)
        .map(|(hz, code)| ChoiceOption::new(&hz.to_string(), code))
        .collect();
    SettingDescriptor::new(
        "polling_rate",
        command,
        SettingKind::Choice(ChoiceParams::new(choices)),
    )
    .label("Polling rate")
    .description("Set polling rate in Hz")
    .cli(&["-p", "--polling-rate"])
    .default_value(1000)
}

fn light_effect(command: &[u8]) -> SettingDescriptor {
    SettingDescriptor::new(
        "light_effect",
        command,
        SettingKind::Choice(ChoiceParams::new(vec![
            ChoiceOption::new("steady", 0x01),
            ChoiceOption::new("breath", 0x03).with_aliases(&["breathe", "breath-medium"]),
            ChoiceOption::new("breath-slow", 0x02),
            ChoiceOption::new("breath-fast", 0x04),
        ])),
    )
    .label("Light effect")
    .cli(&["-e", "--light-effect"])
    .default_value("steady")
}

/// `-s` for the first preset, `-S` for the second
fn sensitivity_short(n: u8) -> &'static str {
    if n == 1 {
        "-s"
    } else {
        "-S"
    }
}

fn save(command: &[u8]) -> Option<CommandSpec> {
    Some(CommandSpec::new(command))
}

fn firmware(command: &[u8]) -> Option<CommandSpec> {
    Some(CommandSpec::new(command).readback_length(2))
}

/// SteelSeries Rival 110
pub fn rival110() -> DeviceProfile {
    let sensitivity = |n: u8, default: i64| {
        SettingDescriptor::new(
            &format!("sensitivity{n}"),
            &[0x03, n],
            SettingKind::Range(RangeParams {
                input_range: RangeSpec::new(200.0, 7200.0, 100.0),
                output_range: RangeSpec::new(0x04 as f64, 0xA7 as f64, 2.33),
                range_length_byte: 1,
            }),
        )
        .label(&format!("Sensitivity preset {n}"))
        .description("Set sensitivity in DPI")
        .cli(&[sensitivity_short(n), &format!("--sensitivity{n}")])
        .default_value(default)
    };

    DeviceProfile {
        name: "rival110".into(),
        display_name: "SteelSeries Rival 110".into(),
        vendor_id: STEELSERIES_VID,
        product_id: 0x1729,
        interface_number: 0,
        settings: vec![
            sensitivity(1, 800),
            sensitivity(2, 1600),
            polling_rate(&[0x04, 0x00], [0x04, 0x03, 0x02, 0x01]),
            SettingDescriptor::new("color", &[0x05, 0x00], SettingKind::Rgbcolor)
                .label("Color")
                .description("Set the mouse color")
                .cli(&["-c", "--color"])
                .default_value("#00FFFF"),
            light_effect(&[0x07, 0x00]),
        ],
        save_command: save(&[0x09]),
        firmware_version: firmware(&[0x10]),
        battery_level: None,
    }
}

/// SteelSeries Rival 3
pub fn rival3() -> DeviceProfile {
    let dpi_table: ChoiceTable = ChoiceTable((1..=85).map(|i| (i * 100, i as u64)).collect());

    DeviceProfile {
        name: "rival3".into(),
        display_name: "SteelSeries Rival 3".into(),
        vendor_id: STEELSERIES_VID,
        product_id: 0x1824,
        interface_number: 3,
        settings: vec![
            SettingDescriptor::new(
                "sensitivity",
                &[0x0B],
                SettingKind::MultidpiRangeChoice(MultiDpiChoiceParams {
                    input_range: RangeSpec::new(100.0, 8500.0, 100.0),
                    choices: dpi_table,
                    layout: PresetLayout::default(),
                }),
            )
            .label("Sensitivity presets")
            .description("Set sensitivity presets (DPI), e.g. 800,1600,3200")
            .cli(&["-s", "--sensitivity"])
            .default_value("800, 1600, 3200"),
            polling_rate(&[0x04], [0x04, 0x03, 0x02, 0x01]),
            SettingDescriptor::new(
                "colors",
                &[0x05, 0x00],
                SettingKind::MultiRgbcolor(MultiColorParams { color_count: 4 }),
            )
            .label("Strip and logo colors")
            .description("Set the 4 LED zone colors (one color sets every zone)")
            .cli(&["-c", "--colors"])
            .default_value("#FF5200"),
            SettingDescriptor::new(
                "reactive",
                &[0x26],
                SettingKind::Reactive(ReactiveParams {
                    led_id: None,
                    duration_min: 1000,
                    duration_max: 9990,
                }),
            )
            .label("Reactive effect")
            .description("Colors shown on click and release")
            .cli(&["-a", "--reactive"])
            .default_value("reactive(colors=white, black; duration=1000)"),
            light_effect(&[0x06, 0x00]),
            SettingDescriptor::new(
                "buttons_mapping",
                &[0x07],
                SettingKind::Buttons(six_buttons(3)),
            )
            .label("Buttons mapping")
            .cli(&["-b", "--buttons"])
            .default_value("default"),
        ],
        save_command: save(&[0x09]),
        firmware_version: Some(
            CommandSpec::new(&[0x10])
                .report_type(ReportType::Feature)
                .readback_length(2),
        ),
        battery_level: None,
    }
}

/// Six-button table: left, right, middle, two side buttons, DPI button
fn six_buttons(field_length: usize) -> ButtonsParams {
    let stride = field_length + 3;
    let mut buttons: Vec<ButtonSpec> = (1..=5u8)
        .map(|i| {
            let name = format!("button{i}");
            ButtonSpec::new(&name, i, usize::from(i - 1) * stride, &name)
        })
        .collect();
    buttons.push(ButtonSpec::new("button6", 0x06, 5 * stride, "dpi"));

    ButtonsParams {
        buttons,
        field_length,
        table_length: Some(6 * stride),
        codes: ButtonCodes::default(),
    }
}

/// Header layout shared by the 310 series gradient commands
fn gradient_310(led_id: u8) -> SettingKind {
    SettingKind::Rgbgradient(RgbGradientParams {
        led_id,
        header_length: 28,
        led_id_offsets: vec![0, 5],
        duration_offset: 6,
        duration_length: 2,
        repeat_offset: 22,
        triggers_offset: 23,
        color_count_offset: 27,
        max_colors: 14,
        duration_min: 0,
        duration_max: 30000,
    })
}

fn series_310(name: &str, display_name: &str, product_id: u16) -> DeviceProfile {
    let sensitivity = |n: u8, default: i64| {
        SettingDescriptor::new(
            &format!("sensitivity{n}"),
            &[0x53, 0x00, n],
            SettingKind::Range(RangeParams {
                input_range: RangeSpec::new(100.0, 12000.0, 100.0),
                output_range: RangeSpec::new(0x00 as f64, 0x77 as f64, 1.0),
                range_length_byte: 1,
            }),
        )
        .suffix(&[0x00, 0x42])
        .packet_length(REPORT_SIZE)
        .report_type(ReportType::Feature)
        .label(&format!("Sensitivity preset {n}"))
        .description("Set sensitivity in DPI")
        .cli(&[sensitivity_short(n), &format!("--sensitivity{n}")])
        .default_value(default)
    };

    DeviceProfile {
        name: name.into(),
        display_name: display_name.into(),
        vendor_id: STEELSERIES_VID,
        product_id,
        interface_number: 0,
        settings: vec![
            sensitivity(1, 800),
            sensitivity(2, 1600),
            polling_rate(&[0x54, 0x00], [0x04, 0x03, 0x02, 0x01])
                .packet_length(REPORT_SIZE)
                .report_type(ReportType::Feature),
            SettingDescriptor::new("logo_color", &[0x5B, 0x00], gradient_310(0x00))
                .packet_length(REPORT_SIZE * 2)
                .report_type(ReportType::Feature)
                .label("Logo color")
                .description("Set the logo color or gradient")
                .cli(&["-c", "--logo-color"])
                .default_value(DEFAULT_GRADIENT),
            SettingDescriptor::new("wheel_color", &[0x5B, 0x00], gradient_310(0x01))
                .packet_length(REPORT_SIZE * 2)
                .report_type(ReportType::Feature)
                .label("Wheel color")
                .description("Set the wheel color or gradient")
                .cli(&["-C", "--wheel-color"])
                .default_value(DEFAULT_GRADIENT),
            SettingDescriptor::new(
                "buttons_mapping",
                &[0x31, 0x00],
                SettingKind::Buttons(six_buttons(2)),
            )
            .packet_length(REPORT_SIZE)
            .report_type(ReportType::Feature)
            .label("Buttons mapping")
            .cli(&["-b", "--buttons"])
            .default_value("default"),
        ],
        save_command: Some(
            CommandSpec::new(&[0x59])
                .report_type(ReportType::Feature),
        ),
        firmware_version: Some(
            CommandSpec::new(&[0x90, 0x00])
                .report_type(ReportType::Feature)
                .readback_length(2),
        ),
        battery_level: None,
    }
}

/// SteelSeries Rival 310
pub fn rival310() -> DeviceProfile {
    series_310("rival310", "SteelSeries Rival 310", 0x1720)
}

/// SteelSeries Sensei 310
pub fn sensei310() -> DeviceProfile {
    series_310("sensei310", "SteelSeries Sensei 310", 0x1722)
}

/// SteelSeries Rival 700
pub fn rival700() -> DeviceProfile {
    let sensitivity = |n: u8, default: i64| {
        SettingDescriptor::new(
            &format!("sensitivity{n}"),
            &[0x03, n],
            SettingKind::Range(RangeParams {
                input_range: RangeSpec::new(100.0, 16000.0, 100.0),
                output_range: RangeSpec::new(0x01 as f64, 0xA0 as f64, 1.0),
                range_length_byte: 1,
            }),
        )
        .label(&format!("Sensitivity preset {n}"))
        .cli(&[sensitivity_short(n), &format!("--sensitivity{n}")])
        .default_value(default)
    };
    let gradient = |led_id: u8| {
        SettingKind::Rival700Rgbgradient(Rival700GradientParams {
            led_id,
            max_colors: 14,
            duration_min: 0,
            duration_max: 30000,
        })
    };

    DeviceProfile {
        name: "rival700".into(),
        display_name: "SteelSeries Rival 700".into(),
        vendor_id: STEELSERIES_VID,
        product_id: 0x1700,
        interface_number: 0,
        settings: vec![
            sensitivity(1, 800),
            sensitivity(2, 1600),
            polling_rate(&[0x04, 0x00], [0x04, 0x03, 0x02, 0x01]),
            SettingDescriptor::new("logo_color", &[0x05], gradient(0x00))
                .label("Logo color")
                .cli(&["-c", "--logo-color"])
                .default_value("#FF1800"),
            SettingDescriptor::new("wheel_color", &[0x05], gradient(0x01))
                .label("Wheel color")
                .cli(&["-C", "--wheel-color"])
                .default_value("#FF1800"),
        ],
        save_command: save(&[0x09]),
        firmware_version: firmware(&[0x10]),
        battery_level: None,
    }
}

/// SteelSeries Aerox 3 Wireless (2.4 GHz dongle)
pub fn aerox3_wireless() -> DeviceProfile {
    let zone = |n: u8, default: &str| {
        SettingDescriptor::new(
            &format!("z{n}_color"),
            &[0x21, 0x01, n - 1],
            SettingKind::Rgbcolor,
        )
        .label(&format!("Zone {n} color"))
        .cli(&[&format!("--z{n}"), &format!("--z{n}-color")])
        .default_value(default)
    };

    let sleep_timer = ChoiceParams {
        choices: [(0u64, "off"), (1, "1"), (5, "5"), (10, "10"), (15, "15"), (20, "20")]
            .into_iter()
            .map(|(minutes, name)| ChoiceOption::new(name, minutes * 60_000))
            .collect(),
        choice_length_byte: 4,
    };

    DeviceProfile {
        name: "aerox3wireless".into(),
        display_name: "SteelSeries Aerox 3 Wireless".into(),
        vendor_id: STEELSERIES_VID,
        product_id: 0x1838,
        interface_number: 3,
        settings: vec![
            SettingDescriptor::new(
                "sensitivity",
                &[0x2D],
                SettingKind::MultidpiRange(MultiDpiRangeParams {
                    input_range: RangeSpec::new(100.0, 18000.0, 100.0),
                    output_range: RangeSpec::new(0x01 as f64, 0xB4 as f64, 1.0),
                    layout: PresetLayout::default(),
                }),
            )
            .label("Sensitivity presets")
            .description("Set sensitivity presets (DPI), e.g. 400,800,1200")
            .cli(&["-s", "--sensitivity"])
            .default_value("400, 800, 1200, 2400, 3200"),
            polling_rate(&[0x2B], [0x03, 0x02, 0x01, 0x00]),
            zone(1, "red"),
            zone(2, "lime"),
            zone(3, "blue"),
            SettingDescriptor::new("reactive_color", &[0x26], SettingKind::ReactiveRgbcolor)
                .label("Reactive color")
                .description("Color shown on click, or off")
                .cli(&["-a", "--reactive-color"])
                .default_value("off"),
            SettingDescriptor::new("sleep_timer", &[0x29], SettingKind::Choice(sleep_timer))
                .label("Sleep timer")
                .description("Minutes of inactivity before sleeping")
                .cli(&["-t", "--sleep-timer"])
                .default_value(5),
        ],
        save_command: save(&[0x11, 0x00]),
        firmware_version: firmware(&[0x10]),
        battery_level: Some(CommandSpec::new(&[0x92]).readback_length(2)),
    }
}

/// SteelSeries Prime
pub fn prime() -> DeviceProfile {
    let cpi_table = ChoiceTable(
        [400, 800, 1200, 1600, 2400, 3200, 6400, 12800, 18000]
            .into_iter()
            .map(|cpi| (cpi, (cpi / 50) as u64))
            .collect(),
    );

    DeviceProfile {
        name: "prime".into(),
        display_name: "SteelSeries Prime".into(),
        vendor_id: STEELSERIES_VID,
        product_id: 0x182E,
        interface_number: 0,
        settings: vec![
            SettingDescriptor::new(
                "sensitivity",
                &[0x2D],
                SettingKind::MulticpiRange(MultiCpiParams {
                    cpi_table,
                    cpi_mode: CpiMode::Single,
                    layout: PresetLayout {
                        dpi_length_byte: 2,
                        ..PresetLayout::default()
                    },
                }),
            )
            .label("Sensitivity presets")
            .description("Set sensitivity presets (CPI), e.g. 400,800,1600")
            .cli(&["-s", "--sensitivity"])
            .default_value("400, 800, 1600, 3200"),
            polling_rate(&[0x2B], [0x03, 0x02, 0x01, 0x00]),
            SettingDescriptor::new(
                "color",
                &[0x62],
                SettingKind::Rgbgradientv2(RgbGradientV2Params {
                    led_id: 0x00,
                    max_colors: 14,
                    min_duration_per_stop: 33,
                    max_duration: 30000,
                }),
            )
            .label("Color")
            .description("Set the mouse color or gradient")
            .cli(&["-c", "--color"])
            .default_value(DEFAULT_GRADIENT),
        ],
        save_command: save(&[0x2A]),
        firmware_version: firmware(&[0x10]),
        battery_level: None,
    }
}

/// Every builtin profile
pub fn all() -> Vec<DeviceProfile> {
    vec![
        rival110(),
        rival3(),
        rival310(),
        sensei310(),
        rival700(),
        aerox3_wireless(),
        prime(),
    ]
}
