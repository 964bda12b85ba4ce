//! Tabulated CIE colorimetric data, 380-780 nm in 10 nm steps.

/// First wavelength of every table in this module, in nanometres.
pub const TABLE_START_NM: f64 = 380.0;

/// Spacing between table rows, in nanometres.
pub const TABLE_STEP_NM: f64 = 10.0;

/// CIE 1931 2-degree standard observer colour-matching functions (x, y, z).
pub const CIE_1931_2DEG: [[f64; 3]; 41] = [
    [0.001368, 0.000039, 0.006450], // 380
    [0.004243, 0.000120, 0.020050], // 390
    [0.014310, 0.000396, 0.067850], // 400
    [0.043510, 0.001210, 0.207400], // 410
    [0.134380, 0.004000, 0.645600], // 420
    [0.283900, 0.011600, 1.385600], // 430
    [0.348280, 0.023000, 1.747060], // 440
    [0.336200, 0.038000, 1.772110], // 450
    [0.290800, 0.060000, 1.669200], // 460
    [0.195360, 0.090980, 1.287640], // 470
    [0.095640, 0.139020, 0.812950], // 480
    [0.032010, 0.208020, 0.465180], // 490
    [0.004900, 0.323000, 0.272000], // 500
    [0.009300, 0.503000, 0.158200], // 510
    [0.063270, 0.710000, 0.078250], // 520
    [0.165500, 0.862000, 0.042160], // 530
    [0.290400, 0.954000, 0.020300], // 540
    [0.433450, 0.994950, 0.008750], // 550
    [0.594500, 0.995000, 0.003900], // 560
    [0.762100, 0.952000, 0.002100], // 570
    [0.916300, 0.870000, 0.001650], // 580
    [1.026300, 0.757000, 0.001100], // 590
    [1.062200, 0.631000, 0.000800], // 600
    [1.002600, 0.503000, 0.000340], // 610
    [0.854450, 0.381000, 0.000190], // 620
    [0.642400, 0.265000, 0.000050], // 630
    [0.447900, 0.175000, 0.000020], // 640
    [0.283500, 0.107000, 0.000000], // 650
    [0.164900, 0.061000, 0.000000], // 660
    [0.087400, 0.032000, 0.000000], // 670
    [0.046770, 0.017000, 0.000000], // 680
    [0.022700, 0.008210, 0.000000], // 690
    [0.011359, 0.004102, 0.000000], // 700
    [0.005790, 0.002091, 0.000000], // 710
    [0.002899, 0.001047, 0.000000], // 720
    [0.001440, 0.000520, 0.000000], // 730
    [0.000690, 0.000249, 0.000000], // 740
    [0.000332, 0.000120, 0.000000], // 750
    [0.000166, 0.000060, 0.000000], // 760
    [0.000083, 0.000030, 0.000000], // 770
    [0.000042, 0.000015, 0.000000], // 780
];

/// CIE 1964 10-degree supplementary observer colour-matching functions (x, y, z).
pub const CIE_1964_10DEG: [[f64; 3]; 41] = [
    [0.000160, 0.000017, 0.000705], // 380
    [0.002362, 0.000253, 0.010482], // 390
    [0.019110, 0.002004, 0.086011], // 400
    [0.084736, 0.008756, 0.389366], // 410
    [0.204492, 0.021391, 0.972542], // 420
    [0.314679, 0.038676, 1.553480], // 430
    [0.383734, 0.062077, 1.967280], // 440
    [0.370702, 0.089456, 1.994800], // 450
    [0.302273, 0.128201, 1.745370], // 460
    [0.195618, 0.185190, 1.317560], // 470
    [0.080507, 0.253589, 0.772125], // 480
    [0.016172, 0.339133, 0.415254], // 490
    [0.003816, 0.460777, 0.218502], // 500
    [0.037465, 0.606741, 0.112044], // 510
    [0.117749, 0.761757, 0.060709], // 520
    [0.236491, 0.875211, 0.030451], // 530
    [0.376772, 0.961988, 0.013676], // 540
    [0.529826, 0.991761, 0.003988], // 550
    [0.705224, 0.997340, 0.000000], // 560
    [0.878655, 0.955552, 0.000000], // 570
    [1.014160, 0.868934, 0.000000], // 580
    [1.118520, 0.777405, 0.000000], // 590
    [1.123990, 0.658341, 0.000000], // 600
    [1.030480, 0.527963, 0.000000], // 610
    [0.856297, 0.398057, 0.000000], // 620
    [0.647467, 0.283493, 0.000000], // 630
    [0.431567, 0.179828, 0.000000], // 640
    [0.268329, 0.107633, 0.000000], // 650
    [0.152568, 0.060281, 0.000000], // 660
    [0.081261, 0.031800, 0.000000], // 670
    [0.040851, 0.015905, 0.000000], // 680
    [0.019941, 0.007749, 0.000000], // 690
    [0.009577, 0.003718, 0.000000], // 700
    [0.004553, 0.001768, 0.000000], // 710
    [0.002175, 0.000846, 0.000000], // 720
    [0.001045, 0.000407, 0.000000], // 730
    [0.000508, 0.000199, 0.000000], // 740
    [0.000251, 0.000098, 0.000000], // 750
    [0.000126, 0.000050, 0.000000], // 760
    [0.000065, 0.000025, 0.000000], // 770
    [0.000033, 0.000013, 0.000000], // 780
];

/// CIE standard illuminant D65 relative spectral power distribution.
pub const ILLUMINANT_D65: [f64; 41] = [
    49.9755, 54.6482, 82.7549, 91.4860, 93.4318, 86.6823,
    104.8650, 117.0080, 117.8120, 114.8610, 115.9230, 108.8110,
    109.3540, 107.8020, 104.7900, 107.6890, 104.4050, 104.0460,
    100.0000, 96.3342, 95.7880, 88.6856, 90.0062, 89.5991,
    87.6987, 83.2886, 83.6992, 80.0268, 80.2146, 82.2778,
    78.2842, 69.7213, 71.6091, 74.3490, 61.6040, 69.8856,
    75.0870, 63.5927, 46.4182, 66.8054, 63.3828,
];
