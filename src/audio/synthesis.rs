//! Glicol composition played when no input device is analysed.
//!
//! Partials are placed to light up the default bin window (roughly
//! 0-5.5 kHz at 44.1 kHz): a pulsing low chord on the left of the graph
//! and a slow triangle sweep travelling across it.

/// Procedural music code for the synth source
pub const GLICOL_COMPOSITION: &str = r#"
~pulse: speed 2.0 >> seq 60 _ 60 60
~env: ~pulse >> envperc 0.002 0.3
~root: saw 110 >> lpf 900.0 1.0 >> mul 0.06
~fifth: sin 330 >> mul ~env >> mul 0.12
~third: sin 554 >> mul 0.05
~high: sin 1235 >> mul ~env >> mul 0.04
~sweep: sin 0.05 >> mul 1800 >> add 2000
~glide: tri ~sweep >> mul 0.05
o: mix ~root ~fifth ~third ~high ~glide >> mul 0.8
"#;
