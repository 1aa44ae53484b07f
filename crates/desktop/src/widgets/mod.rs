pub mod icao_panel;
