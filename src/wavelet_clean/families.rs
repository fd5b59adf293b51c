//! Orthogonal wavelet filter families
//!
//! Scaling filters are stored in reconstruction order; the other three
//! filters of the bank are derived from them. Daubechies filters are the
//! minimum-phase solutions, symlets the least-asymmetric ones.
//!
//! The discrete Meyer filter is the conventional 62-tap FIR approximation of
//! the Meyer wavelet. It is only nearly orthogonal, so decomposition followed
//! by reconstruction reproduces the input to about 1e-2, not to rounding error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DenoiseError;

/// Highest Daubechies order with a stored filter
pub const MAX_DAUBECHIES_ORDER: u8 = 10;

/// Symlet orders with a stored filter
pub const SYMLET_ORDERS: [u8; 2] = [4, 8];

/// Coiflet orders with a stored filter
pub const COIFLET_ORDERS: [u8; 2] = [1, 2];

/// Wavelet family used by the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterFamily {
    /// Haar wavelet (identical to db1)
    Haar,
    /// Daubechies wavelet with `N` vanishing moments (db1-db10)
    Daubechies(u8),
    /// Least-asymmetric Daubechies wavelet (sym4, sym8)
    Symlet(u8),
    /// Coiflet (coif1, coif2)
    Coiflet(u8),
    /// FIR approximation of the Meyer wavelet ("dmey")
    DiscreteMeyer,
}

impl Default for FilterFamily {
    fn default() -> Self {
        FilterFamily::Daubechies(4)
    }
}

/// The four filters of a two-channel orthogonal filter bank
#[derive(Debug, Clone)]
pub struct FilterBank {
    /// Low-pass decomposition filter
    pub dec_lo: Vec<f64>,
    /// High-pass decomposition filter
    pub dec_hi: Vec<f64>,
    /// Low-pass reconstruction filter
    pub rec_lo: Vec<f64>,
    /// High-pass reconstruction filter
    pub rec_hi: Vec<f64>,
}

impl FilterBank {
    fn from_scaling(rec_lo: &[f64]) -> Self {
        let rec_lo = rec_lo.to_vec();
        let dec_lo: Vec<f64> = rec_lo.iter().rev().copied().collect();

        // Quadrature mirror of the decomposition low-pass
        let rec_hi: Vec<f64> = dec_lo
            .iter()
            .enumerate()
            .map(|(k, &c)| if k % 2 == 0 { c } else { -c })
            .collect();
        let dec_hi: Vec<f64> = rec_hi.iter().rev().copied().collect();

        Self { dec_lo, dec_hi, rec_lo, rec_hi }
    }

    /// Filter length (support) shared by all four filters
    pub fn support(&self) -> usize {
        self.dec_lo.len()
    }
}

impl FilterFamily {
    /// Conventional short name ("haar", "db4", "sym8", "dmey", ...)
    pub fn name(&self) -> String {
        match self {
            FilterFamily::Haar => "haar".to_string(),
            FilterFamily::Daubechies(n) => format!("db{}", n),
            FilterFamily::Symlet(n) => format!("sym{}", n),
            FilterFamily::Coiflet(n) => format!("coif{}", n),
            FilterFamily::DiscreteMeyer => "dmey".to_string(),
        }
    }

    /// Stored scaling filter, or `UnknownWavelet` for an order without one
    fn scaling(&self) -> Result<&'static [f64], DenoiseError> {
        let scaling: &'static [f64] = match self {
            FilterFamily::Haar | FilterFamily::Daubechies(1) => &HAAR,
            FilterFamily::Daubechies(2) => &DB2,
            FilterFamily::Daubechies(3) => &DB3,
            FilterFamily::Daubechies(4) => &DB4,
            FilterFamily::Daubechies(5) => &DB5,
            FilterFamily::Daubechies(6) => &DB6,
            FilterFamily::Daubechies(7) => &DB7,
            FilterFamily::Daubechies(8) => &DB8,
            FilterFamily::Daubechies(9) => &DB9,
            FilterFamily::Daubechies(10) => &DB10,
            FilterFamily::Symlet(4) => &SYM4,
            FilterFamily::Symlet(8) => &SYM8,
            FilterFamily::Coiflet(1) => &COIF1,
            FilterFamily::Coiflet(2) => &COIF2,
            FilterFamily::DiscreteMeyer => &DMEY,
            _ => return Err(DenoiseError::UnknownWavelet(self.name())),
        };
        Ok(scaling)
    }

    /// Number of taps in each filter of the bank
    pub fn filter_len(&self) -> Result<usize, DenoiseError> {
        self.scaling().map(<[f64]>::len)
    }

    /// Whether the filter bank reconstructs exactly (up to rounding)
    pub fn is_orthogonal(&self) -> bool {
        !matches!(self, FilterFamily::DiscreteMeyer)
    }

    /// Build the filter bank for this family
    pub fn filter_bank(&self) -> Result<FilterBank, DenoiseError> {
        Ok(FilterBank::from_scaling(self.scaling()?))
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for FilterFamily {
    type Err = DenoiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let order = |prefix: &str| name.strip_prefix(prefix).and_then(|n| n.parse::<u8>().ok());

        let family = if name == "haar" {
            Some(FilterFamily::Haar)
        } else if name == "dmey" {
            Some(FilterFamily::DiscreteMeyer)
        } else if let Some(n) = order("db") {
            Some(FilterFamily::Daubechies(n))
        } else if let Some(n) = order("sym") {
            Some(FilterFamily::Symlet(n))
        } else {
            order("coif").map(FilterFamily::Coiflet)
        };

        // Only names with a stored filter parse
        match family {
            Some(family) if family.scaling().is_ok() => Ok(family),
            _ => Err(DenoiseError::UnknownWavelet(s.to_string())),
        }
    }
}

// Serialized by name so config files read "wavelet": "db4"
impl Serialize for FilterFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for FilterFamily {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

const HAAR: [f64; 2] = [std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2];

const DB2: [f64; 4] = [
    0.48296291314453427, 0.836516303737808,
    0.2241438680420133, -0.12940952255126045,
];

const DB3: [f64; 6] = [
    0.3326705529500827, 0.8068915093110927,
    0.45987750211849154, -0.13501102001025464,
    -0.08544127388202664, 0.03522629188570957,
];

const DB4: [f64; 8] = [
    0.23037781330889656, 0.7148465705529159,
    0.630880767929859, -0.02798376941685991,
    -0.18703481171909314, 0.030841381835560764,
    0.032883011666885203, -0.010597401785069037,
];

const DB5: [f64; 10] = [
    0.16010239797419293, 0.6038292697971896,
    0.724308528437773, 0.1384281459013204,
    -0.24229488706638194, -0.03224486958463837,
    0.07757149384004572, -0.006241490212798286,
    -0.012580751999082, 0.003335725285473773,
];

const DB6: [f64; 12] = [
    0.11154074335010948, 0.49462389039845306,
    0.7511339080210955, 0.3152503517091976,
    -0.2262646939654398, -0.1297668675672619,
    0.09750160558732306, 0.027522865530305717,
    -0.03158203931748603, 0.0005538422011615001,
    0.004777257510945511, -0.0010773010853084798,
];

const DB7: [f64; 14] = [
    0.07785205408500911, 0.39653931948191695,
    0.7291320908462352, 0.46978228740519296,
    -0.14390600392856434, -0.22403618499387484,
    0.07130921926683022, 0.08061260915108295,
    -0.03802993693501431, -0.01657454163066689,
    0.012550998556099828, 0.00042957797292136706,
    -0.0018016407040474882, 0.0003537137999745195,
];

const DB8: [f64; 16] = [
    0.054415842243104, 0.3128715909142999,
    0.6756307362972899, 0.5853546836542064,
    -0.01582910525634852, -0.2840155429615476,
    0.00047248457391386897, 0.12874742662047808,
    -0.017369301001807325, -0.04408825393079482,
    0.013981027917398279, 0.008746094047405773,
    -0.0048703529934515715, -0.0003917403733769468,
    0.000675449406450569, -0.00011747678412476945,
];

const DB9: [f64; 18] = [
    0.03807794736387833, 0.24383467461259023,
    0.6048231236901112, 0.6572880780513004,
    0.1331973858250077, -0.29327378327917536,
    -0.09684078322297536, 0.14854074933810546,
    0.030725681479333626, -0.06763282906133002,
    0.0002509471148315012, 0.022361662123679054,
    -0.004723204757751378, -0.0042815036824634355,
    0.0018476468830562272, 0.00023038576352319565,
    -0.00025196318894271, 3.934732031627159e-05,
];

const DB10: [f64; 20] = [
    0.026670057900555558, 0.18817680007769158,
    0.5272011889317254, 0.688459039453604,
    0.2811723436605769, -0.24984642432731527,
    -0.19594627437737608, 0.1273693403357913,
    0.09305736460357428, -0.07139414716639834,
    -0.02945753682187524, 0.033212674059340835,
    0.003606553566956188, -0.010733175483330568,
    0.0013953517470528941, 0.0019924052951850587,
    -0.0006858566949597124, -0.00011646685512928537,
    9.358867032006958e-05, -1.3264202894521243e-05,
];

const SYM4: [f64; 8] = [
    0.032223100604051466, -0.012603967262031314,
    -0.09921954357663365, 0.29785779560530584,
    0.803738751805132, 0.4976186676327752,
    -0.029635527646002337, -0.07576571478950217,
];

const SYM8: [f64; 16] = [
    0.001889950332772812, -0.0003029205147294168,
    -0.014952258337188527, 0.003808752013572351,
    0.04913717967331205, -0.02721902991801768,
    -0.05194583811017585, 0.3644418948334727,
    0.7771857516994258, 0.4813596512618504,
    -0.061273359064942405, -0.14329423835019975,
    0.007607487325062672, 0.031695087811582166,
    -0.0005421323317190095, -0.0033824159509831943,
];

const COIF1: [f64; 6] = [
    -0.07273261951252646, 0.3378976624574818,
    0.8525720202116004, 0.3848648468648578,
    -0.07273261951252646, -0.01565572813579199,
];

const COIF2: [f64; 12] = [
    0.016387336464337716, -0.04146493678611082,
    -0.06737255473320777, 0.38611006680537974,
    0.8127236354486737, 0.4170051844410648,
    -0.07648859906777417, -0.05943441864793758,
    0.023680171945406298, 0.005611434819725982,
    -0.0018232088708882283, -0.0007205494455746677,
];

const DMEY: [f64; 62] = [
    0.0, -1.009999956941423e-12,
    8.519459636796214e-09, -1.111944952595278e-08,
    -1.0798819539621958e-08, 6.066975741351135e-08,
    -1.0866516536735883e-07, 8.200680650386481e-08,
    1.1783004497663934e-07, -5.506340565252278e-07,
    1.1307947017916706e-06, -1.489549216497156e-06,
    7.367572885903746e-07, 3.20544191334478e-06,
    -1.6312699734552807e-05, 6.554305930575149e-05,
    -0.0006011502343516092, -0.002704672124643725,
    0.002202534100911002, 0.006045814097323304,
    -0.006387718318497156, -0.011061496392513451,
    0.015270015130934803, 0.017423434103729693,
    -0.03213079399021176, -0.024348745906078023,
    0.0637390243228016, 0.030655091960824263,
    -0.13284520043622938, -0.035087555656258346,
    0.44459300275757724, 0.7445855923188063,
    0.44459300275757724, -0.035087555656258346,
    -0.13284520043622938, 0.030655091960824263,
    0.0637390243228016, -0.024348745906078023,
    -0.03213079399021176, 0.017423434103729693,
    0.015270015130934803, -0.011061496392513451,
    -0.006387718318497156, 0.006045814097323304,
    0.002202534100911002, -0.002704672124643725,
    -0.0006011502343516092, 6.554305930575149e-05,
    -1.6312699734552807e-05, 3.20544191334478e-06,
    7.367572885903746e-07, -1.489549216497156e-06,
    1.1307947017916706e-06, -5.506340565252278e-07,
    1.1783004497663934e-07, 8.200680650386481e-08,
    -1.0866516536735883e-07, 6.066975741351135e-08,
    -1.0798819539621958e-08, -1.111944952595278e-08,
    8.519459636796214e-09, -1.009999956941423e-12,
];
