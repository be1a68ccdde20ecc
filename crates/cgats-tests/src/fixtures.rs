//! Sample payloads in the shape measurement and calibration tools write them.

/// A test chart: RGB device values to be measured.
pub const TI1: &str = r#"CTI1

DESCRIPTOR "Argyll Calibration Target chart information 1"
ORIGINATOR "Argyll targen"
CREATED "Sat Mar 16 11:52:06 2013"
KEYWORD "APPROX_WHITE_POINT"
APPROX_WHITE_POINT "95.045781 100.000003 108.905751"
KEYWORD "COLOR_REP"
COLOR_REP "RGB"

KEYWORD "SAMPLE_ID"
NUMBER_OF_FIELDS 7
BEGIN_DATA_FORMAT
SAMPLE_ID RGB_R RGB_G RGB_B XYZ_X XYZ_Y XYZ_Z
END_DATA_FORMAT

NUMBER_OF_SETS 4
BEGIN_DATA
1 100.00 100.00 100.00 95.046 100.00 108.91
2 0.0000 0.0000 0.0000 1.0000 1.0000 1.0000
3 100.00 0.0000 0.0000 41.830 22.052 2.9132
4 0.0000 100.00 0.0000 36.405 71.941 12.802
END_DATA

CTI1

DESCRIPTOR "Argyll Calibration Target chart information 1"
ORIGINATOR "Argyll targen"
CREATED "Sat Mar 16 11:52:06 2013"

NUMBER_OF_FIELDS 4
BEGIN_DATA_FORMAT
INDEX RGB_R RGB_G RGB_B
END_DATA_FORMAT

NUMBER_OF_SETS 2
BEGIN_DATA
0 100.00 100.00 100.00
1 0.0000 0.0000 0.0000
END_DATA
"#;

/// Measurement results with an embedded calibration.
pub const TI3: &str = r#"CTI3

DESCRIPTOR "Argyll Calibration Target chart information 3"
ORIGINATOR "Argyll dispread"
CREATED "Sat Mar 16 12:10:45 2013"
KEYWORD "DEVICE_CLASS"
DEVICE_CLASS "DISPLAY"
KEYWORD "COLOR_REP"
COLOR_REP "RGB_XYZ"
KEYWORD "LUMINANCE_XYZ_CDM2"
LUMINANCE_XYZ_CDM2 "118.532051 124.657219 135.441712"
# Measured with a colorimeter, corrected
KEYWORD "DISPLAY_TYPE_REFRESH"
DISPLAY_TYPE_REFRESH "NO"

NUMBER_OF_FIELDS 7
BEGIN_DATA_FORMAT
SAMPLE_ID RGB_R RGB_G RGB_B XYZ_X XYZ_Y XYZ_Z
END_DATA_FORMAT

NUMBER_OF_SETS 3
BEGIN_DATA
1 100.00 100.00 100.00 95.106 100.00 108.65
2 0.0000 0.0000 0.0000 0.2611 0.2678 0.4097
3 100.00 0.0000 0.0000 41.924 21.634 1.9672
END_DATA

CAL

DESCRIPTOR "Argyll Device Calibration State"
ORIGINATOR "Argyll dispcal"
CREATED "Sat Mar 16 12:01:12 2013"
KEYWORD "DEVICE_CLASS"
DEVICE_CLASS "DISPLAY"
KEYWORD "COLOR_REP"
COLOR_REP "RGB"
KEYWORD "VIDEO_LUT_CALIBRATION_POSSIBLE"
VIDEO_LUT_CALIBRATION_POSSIBLE "YES"

KEYWORD "RGB_I"
NUMBER_OF_FIELDS 4
BEGIN_DATA_FORMAT
RGB_I RGB_R RGB_G RGB_B
END_DATA_FORMAT

NUMBER_OF_SETS 3
BEGIN_DATA
0.00000 0.00000 0.00000 0.00000
0.50000 0.48213 0.49001 0.50712
1.00000 1.00000 0.99124 0.97785
END_DATA
"#;

/// A chart from a different toolchain: a date line, a free-form section and
/// quoted patch names with spaces.
pub const MEASUREMENT: &str = "CGATS.17\r\n\
ORIGINATOR \"i1Profiler\"\r\n\
Date: 3/16/2013\r\n\
BEGIN_DESCRIPTION\r\n\
Patch set for a\r\n\
display profile\r\n\
END_DESCRIPTION\r\n\
NUMBER_OF_FIELDS 5\r\n\
BEGIN_DATA_FORMAT\r\n\
SAMPLE_ID SAMPLE_NAME LAB_L LAB_A LAB_B\r\n\
END_DATA_FORMAT\r\n\
NUMBER_OF_SETS 3\r\n\
BEGIN_DATA\r\n\
1 \"White patch\" 100.00 0.00 0.00\r\n\
2 \"Black patch\" 0.00 0.00 0.00\r\n\
3 \"Mid gray\" 53.39 0.004 -0.011\r\n\
END_DATA\r\n";
