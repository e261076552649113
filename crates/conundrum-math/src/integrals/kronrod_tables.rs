//! Abscissae and weights of the Gauss-Kronrod and Gauss-Kronrod-Patterson
//! rules on `[-1, 1]` (QUADPACK).

// ── 10/21/43/87-point rules (non-adaptive) ───────────────────────────────────

/// Abscissae common to the 10-, 21-, 43- and 87-point rules.
pub(super) const X1: [f64; 5] = [
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.148_874_338_981_631_210_884_826_001_129_720,
];

/// Weights of the 10-point Gauss rule.
pub(super) const W10: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

/// Abscissae common to the 21-, 43- and 87-point rules.
pub(super) const X2: [f64; 5] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.294_392_862_701_460_198_131_126_603_103_866,
];

/// Weights of the 21-point rule for abscissae `X1`.
pub(super) const W21A: [f64; 5] = [
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.147_739_104_901_338_491_374_841_515_972_068,
];

/// Weights of the 21-point rule for abscissae `X2` and the center.
pub(super) const W21B: [f64; 6] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.123_491_976_262_065_851_077_808_533_935_346,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// Abscissae common to the 43- and 87-point rules.
pub(super) const X3: [f64; 11] = [
    0.999_333_360_901_932_081_394_099_323_919_911,
    0.987_433_402_908_088_869_795_961_478_381_209,
    0.954_807_934_814_266_299_257_919_200_290_473,
    0.900_148_695_748_328_293_625_099_494_069_092,
    0.825_198_314_983_114_150_847_066_732_588_520,
    0.732_148_388_989_304_982_612_354_848_755_461,
    0.622_847_970_537_725_238_641_159_120_344_323,
    0.499_479_574_071_056_499_952_214_885_499_755,
    0.364_901_661_346_580_768_043_989_548_502_644,
    0.222_254_919_776_601_296_498_260_928_066_212,
    0.074_650_617_461_383_322_043_914_435_796_506,
];

/// Weights of the 43-point rule for abscissae `X1`, `X2`.
pub(super) const W43A: [f64; 10] = [
    0.016_296_734_289_666_564_924_281_974_617_663,
    0.037_522_876_120_869_501_461_613_795_898_115,
    0.054_694_902_058_255_442_147_212_685_465_005,
    0.067_355_414_609_478_086_075_553_166_302_174,
    0.073_870_199_632_393_953_432_140_695_251_367,
    0.005_768_556_059_769_796_184_184_327_908_655,
    0.027_371_890_593_248_842_081_276_069_289_151,
    0.046_560_826_910_428_830_743_339_154_433_824,
    0.061_744_995_201_442_564_496_240_336_030_883,
    0.071_387_267_268_693_397_768_559_114_425_516,
];

/// Weights of the 43-point rule for abscissae `X3` and the center.
pub(super) const W43B: [f64; 12] = [
    0.001_844_477_640_212_414_100_389_106_552_965,
    0.010_798_689_585_891_651_740_465_406_741_293,
    0.021_895_363_867_795_428_102_523_123_075_149,
    0.032_597_463_975_345_689_443_882_222_526_137,
    0.042_163_137_935_191_811_847_627_924_327_955,
    0.050_741_939_600_184_577_780_189_020_092_084,
    0.058_379_395_542_619_248_375_475_369_330_206,
    0.064_746_404_951_445_885_544_689_259_517_511,
    0.069_566_197_912_356_484_528_633_315_038_405,
    0.072_824_441_471_833_208_150_939_535_192_842,
    0.074_507_751_014_175_118_273_571_813_842_889,
    0.074_722_147_517_403_005_594_425_168_280_423,
];

/// Abscissae of the 87-point rule.
pub(super) const X4: [f64; 22] = [
    0.999_902_977_262_729_234_490_529_830_591_582,
    0.997_989_895_986_678_745_427_496_322_365_960,
    0.992_175_497_860_687_222_808_523_352_251_425,
    0.981_358_163_572_712_773_571_916_941_623_894,
    0.965_057_623_858_384_619_128_284_110_607_926,
    0.943_167_613_133_670_596_816_416_634_507_426,
    0.915_806_414_685_507_209_591_826_430_720_050,
    0.883_221_657_771_316_501_372_117_548_744_163,
    0.845_710_748_462_415_666_605_902_011_504_855,
    0.803_557_658_035_230_982_788_739_474_980_964,
    0.757_005_730_685_495_558_328_942_793_432_020,
    0.706_273_209_787_321_819_824_094_274_740_840,
    0.651_589_466_501_177_922_534_422_205_016_736,
    0.593_223_374_057_961_088_875_273_770_349_144,
    0.531_493_605_970_831_932_285_268_948_562_671,
    0.466_763_623_042_022_844_871_966_781_659_270,
    0.399_424_847_859_218_804_732_101_665_817_923,
    0.329_874_877_106_188_288_265_053_371_824_597,
    0.258_503_559_202_161_551_802_280_975_429_025,
    0.185_695_396_568_346_652_015_917_141_167_606,
    0.111_842_213_179_907_468_172_398_359_241_362,
    0.037_352_123_394_619_870_814_998_165_437_704,
];

/// Weights of the 87-point rule for abscissae `X1`, `X2`, `X3`.
pub(super) const W87A: [f64; 21] = [
    0.008_148_377_384_149_172_900_002_878_448_190,
    0.018_761_438_201_562_822_243_935_059_003_794,
    0.027_347_451_050_052_286_161_582_829_741_283,
    0.033_677_707_311_637_930_046_581_056_957_588,
    0.036_935_099_820_427_907_614_589_586_742_499,
    0.002_884_872_430_211_530_501_334_156_248_695,
    0.013_685_946_022_712_701_888_950_035_273_128,
    0.023_280_413_502_888_311_123_409_291_030_404,
    0.030_872_497_611_713_358_675_466_394_126_442,
    0.035_693_633_639_418_770_719_351_355_457_044,
    0.000_915_283_345_202_241_360_843_392_549_948,
    0.005_399_280_219_300_471_367_738_743_391_053,
    0.010_947_679_601_118_931_134_327_826_856_808,
    0.016_298_731_696_787_335_262_665_703_223_280,
    0.021_081_568_889_203_835_112_433_060_188_190,
    0.025_370_969_769_253_827_243_467_999_831_710,
    0.029_189_697_756_475_752_501_446_154_084_920,
    0.032_373_202_467_202_789_685_788_194_889_595,
    0.034_783_098_950_365_142_750_781_997_949_596,
    0.036_412_220_731_351_787_562_801_163_687_577,
    0.037_253_875_503_047_708_539_592_001_191_226,
];

/// Weights of the 87-point rule for abscissae `X4` and the center.
pub(super) const W87B: [f64; 23] = [
    0.000_274_145_563_762_072_350_016_527_092_881,
    0.001_807_124_155_057_942_948_341_311_753_254,
    0.004_096_869_282_759_164_864_458_070_683_480,
    0.006_758_290_051_847_378_699_816_577_897_424,
    0.009_549_957_672_201_646_536_053_581_325_377,
    0.012_329_447_652_244_853_694_626_639_963_780,
    0.015_010_447_346_388_952_376_697_286_041_943,
    0.017_548_967_986_243_191_099_665_352_925_900,
    0.019_938_037_786_440_888_202_278_192_730_714,
    0.022_194_935_961_012_286_796_332_102_959_499,
    0.024_339_147_126_000_805_470_360_647_041_454,
    0.026_374_505_414_839_207_241_503_786_552_615,
    0.028_286_910_788_771_200_659_968_002_987_960,
    0.030_052_581_128_092_695_322_521_110_347_341,
    0.031_646_751_371_439_929_404_586_051_078_883,
    0.033_050_413_419_978_503_290_785_944_862_689,
    0.034_255_099_704_226_061_787_082_821_046_821,
    0.035_262_412_660_156_681_033_782_717_998_428,
    0.036_076_989_622_888_701_185_500_318_003_895,
    0.036_698_604_498_456_094_498_018_047_441_094,
    0.037_120_549_269_832_576_114_119_958_413_599,
    0.037_334_228_751_935_040_321_235_449_094_698,
    0.037_361_073_762_679_023_410_321_241_766_599,
];

// ── 7/15-point pair (adaptive) ───────────────────────────────────────────────

/// Weights of the 7-point Gauss rule (center first).
pub(super) const G7_WEIGHTS: [f64; 4] = [
    0.417_959_183_673_469,
    0.381_830_050_505_119,
    0.279_705_391_489_277,
    0.129_484_966_168_870,
];

/// Weights of the 15-point Kronrod rule (center first).
pub(super) const K15_WEIGHTS: [f64; 8] = [
    0.209_482_141_084_728,
    0.204_432_940_075_298,
    0.190_350_578_064_785,
    0.169_004_726_639_267,
    0.140_653_259_715_525,
    0.104_790_010_322_250,
    0.063_092_092_629_979,
    0.022_935_322_010_529,
];

/// Abscissae of the 15-point Kronrod rule; the even ones are the Gauss
/// nodes.
pub(super) const K15_NODES: [f64; 8] = [
    0.000_000_000_000_000,
    0.207_784_955_007_898,
    0.405_845_151_377_397,
    0.586_087_235_467_691,
    0.741_531_185_599_394,
    0.864_864_423_359_769,
    0.949_107_912_342_759,
    0.991_455_371_120_813,
];
