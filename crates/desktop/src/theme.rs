use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::settings::Appearance;

/// Resolve the iced Theme from appearance + high_contrast settings.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => system_prefers_dark(),
    };

    let palette = match (is_dark, high_contrast) {
        (true, false) => dark_palette(),
        (false, false) => light_palette(),
        (true, true) => high_contrast_dark_palette(),
        (false, true) => high_contrast_light_palette(),
    };

    Theme::custom("ICAO Watch", palette)
}

/// Secondary text color derived from the palette text color.
pub fn tertiary_color(theme: &Theme) -> Color {
    Color {
        a: 0.55,
        ..theme.palette().text
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x1a, 0x1d, 0x21),
        text: color!(0xd6, 0xd6, 0xd6),
        primary: color!(0x4f, 0x93, 0xe8),
        success: color!(0x2f, 0xb8, 0x5a),
        warning: color!(0xf0, 0xb4, 0x29),
        danger: color!(0xe8, 0x4a, 0x3f),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf6, 0xf7, 0xf8),
        text: color!(0x20, 0x22, 0x24),
        primary: color!(0x2b, 0x6f, 0xd4),
        success: color!(0x27, 0x9e, 0x4c),
        warning: color!(0xc7, 0x7d, 0x0a),
        danger: color!(0xd6, 0x33, 0x2b),
    }
}

fn high_contrast_dark_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0xff, 0xff, 0xff),
        primary: color!(0x7a, 0xbc, 0xff),
        success: color!(0x37, 0xd9, 0x6a),
        warning: color!(0xff, 0xd2, 0x33),
        danger: color!(0xff, 0x55, 0x48),
    }
}

fn high_contrast_light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x00, 0x00, 0x00),
        primary: color!(0x00, 0x48, 0xbd),
        success: color!(0x1c, 0x7a, 0x38),
        warning: color!(0x9a, 0x56, 0x00),
        danger: color!(0xc2, 0x00, 0x12),
    }
}

/// Best-effort probe of the OS dark-mode preference; defaults to dark
/// when the answer cannot be determined.
fn system_prefers_dark() -> bool {
    #[cfg(target_os = "macos")]
    {
        // `defaults` reports the key only when dark mode is active.
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().eq_ignore_ascii_case("dark"))
            .unwrap_or(true)
    }
    #[cfg(target_os = "windows")]
    {
        // AppsUseLightTheme: DWORD 0 = dark, 1 = light.
        std::process::Command::new("reg")
            .args([
                "query",
                r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize",
                "/v",
                "AppsUseLightTheme",
            ])
            .output()
            .map(|out| String::from_utf8_lossy(&out.stdout).contains("0x0"))
            .unwrap_or(true)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        true
    }
}
