//! Reference identifiers
//!
//! Mixtures come from the MInChI demonstration set at http://molmatinf.com/minchidemo/.

/// Caffeine, a standalone substance
pub const CAFFEINE: &str = "InChI=1S/C8H10N4O2/c1-10-4-9-6-5(10)7(13)12(3)8(14)11(6)2/h4H,1-3H3";

/// (R)-butan-2-ol and its (S) enantiomer differ in one stereo character
pub const BUTANOL_R: &str = "InChI=1S/C4H10O/c1-3-4(2)5/h4-5H,3H2,1-2H3/t4-/m1/s1";
pub const BUTANOL_S: &str = "InChI=1S/C4H10O/c1-3-4(2)5/h4-5H,3H2,1-2H3/t4-/m0/s1";

pub const WATER: &str = "InChI=1S/H2O/h1H2";

/// 37% wt. formaldehyde in water with 10-15% methanol
pub const FORMALDEHYDE: &str =
    "MInChI=0.00.1S/CH2O/c1-2/h1H2&CH4O/c1-2/h2H,1H3&H2O/h1H2/n{{1&3}&2}/g{{37wf-2&}&10:15pp0}";

/// Lithium diisopropylamide in tetrahydrofuran and hexanes, three levels deep
pub const LITHIUM_DIISOPROPYLAMIDE_SOLUTION: &str =
    "MInChI=0.00.1S/C4H8O/c1-2-4-5-3-1/h1-4H2&C6H12/c1-6-4-2-3-5-6/h6H,2-5H2,1H3&C6H14/c1-3-5-6-4-2/\
    h3-6H2,1-2H3&C6H14/c1-4-5-6(2)3/h6H,4-5H2,1-3H3&C6H14/c1-4-6(3)5-2/h6H,4-5H2,1-3H3&C6H14N.Li/c1-5\
    (2)7-6(3)4;/h5-6H,1-4H3;/q-1;+1/n{6&{1&{3&2&4&5}}}/g{1mr0&{1vp0&{5:7pp1&1:2pp1&1:5pp0&1:5pp0}7vp0}}";

/// Dishwashing liquid: an empty grouping slot and a component referenced three times
pub const DISHWASHING_LIQUID: &str =
    "MInChI=0.00.1S/C12H26O4S.Na/c1-2-3-4-5-6-7-8-9-10-11-12-16-17(13,14)15;/h2-12H2,1H3,(H,13,14,15);\
    /q;+1/p-1&C18H30O3S.Na/c1-2-3-4-5-6-7-8-9-10-11-12-17-13-15-18(16-14-17)22(19,20)21;/h13-16H,2-12H2,\
    1H3,(H,19,20,21);/q;+1/p-1&ClH.Na/h1H;/q;+1/p-1&H2O/h1H2/n{4&{2&4}&&{1&4}&3}/g{807wf-3&{6pp1&4pp1}\
    117wf-3&1wf-2&{27pp0&73pp0}66wf-3&}";

/// Every mixture fixture
pub const MIXTURES: [&str; 3] = [
    FORMALDEHYDE,
    LITHIUM_DIISOPROPYLAMIDE_SOLUTION,
    DISHWASHING_LIQUID,
];
